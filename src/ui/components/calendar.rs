//! Calendar Component
//!
//! Month grid with a day cursor. Choosing a day hands the date back to the
//! parent view.

use chrono::{Datelike, Days, Months, NaiveDate};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Widget},
};

use super::popup::centered_rect_fixed;

const WEEKDAY_HEADER: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// Result of choosing a day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarOutcome {
    Selected(NaiveDate),
}

#[derive(Debug, Clone)]
pub struct CalendarState {
    cursor: NaiveDate,
    selected: Option<NaiveDate>,
    today: NaiveDate,
}

impl CalendarState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            cursor: today,
            selected: None,
            today,
        }
    }

    pub fn cursor(&self) -> NaiveDate {
        self.cursor
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Move by whole days; out-of-range moves are ignored
    pub fn move_days(&mut self, days: i64) {
        let magnitude = Days::new(days.unsigned_abs());
        let moved = if days >= 0 {
            self.cursor.checked_add_days(magnitude)
        } else {
            self.cursor.checked_sub_days(magnitude)
        };
        if let Some(date) = moved {
            self.cursor = date;
        }
    }

    pub fn move_weeks(&mut self, weeks: i64) {
        self.move_days(weeks * 7);
    }

    /// Same day next month, clamped to the month's last day
    pub fn next_month(&mut self) {
        if let Some(date) = self.cursor.checked_add_months(Months::new(1)) {
            self.cursor = date;
        }
    }

    pub fn prev_month(&mut self) {
        if let Some(date) = self.cursor.checked_sub_months(Months::new(1)) {
            self.cursor = date;
        }
    }

    pub fn go_today(&mut self) {
        self.cursor = self.today;
    }

    pub fn select(&mut self) -> CalendarOutcome {
        self.selected = Some(self.cursor);
        CalendarOutcome::Selected(self.cursor)
    }

    /// Monday-first weeks of the cursor's month
    pub fn month_grid(&self) -> Vec<[Option<NaiveDate>; 7]> {
        let first = self.cursor.with_day(1).unwrap_or(self.cursor);
        let offset = first.weekday().num_days_from_monday() as usize;
        let days = days_in_month(first);

        let mut weeks = Vec::new();
        let mut week = [None; 7];
        for day in 0..days {
            let slot = (offset + day as usize) % 7;
            week[slot] = first.checked_add_days(Days::new(u64::from(day)));
            if slot == 6 {
                weeks.push(week);
                week = [None; 7];
            }
        }
        if week.iter().any(Option::is_some) {
            weeks.push(week);
        }
        weeks
    }
}

fn days_in_month(first: NaiveDate) -> u32 {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map_or(31, |last| last.day())
}

/// Calendar widget
pub struct CalendarWidget<'a> {
    state: &'a CalendarState,
}

impl<'a> CalendarWidget<'a> {
    pub fn new(state: &'a CalendarState) -> Self {
        Self { state }
    }
}

impl Widget for CalendarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let grid = self.state.month_grid();
        let height = grid.len() as u16 + 4;
        let cal_area = centered_rect_fixed(30, height, area);

        let title = format!(" {} ", self.state.cursor.format("%B %Y"));
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Magenta));

        let inner = block.inner(cal_area);
        block.render(cal_area, buf);
        if inner.is_empty() {
            return;
        }

        let x0 = inner.x + 1;
        for (i, name) in WEEKDAY_HEADER.iter().enumerate() {
            let style = if i >= 5 {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Gray)
            };
            buf.set_string(x0 + i as u16 * 4, inner.y, *name, style);
        }

        for (row, week) in grid.iter().enumerate() {
            let y = inner.y + 1 + row as u16;
            if y >= inner.y + inner.height {
                break;
            }
            for (col, date) in week.iter().enumerate() {
                let Some(date) = date else { continue };

                let mut style = Style::default().fg(Color::White);
                if *date == self.state.today {
                    style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
                }
                if Some(*date) == self.state.selected {
                    style = style.fg(Color::Green).add_modifier(Modifier::UNDERLINED);
                }
                if *date == self.state.cursor {
                    style = style.bg(Color::Magenta).fg(Color::Black);
                }

                buf.set_string(x0 + col as u16 * 4, y, format!("{:>2}", date.day()), style);
            }
        }
    }
}
