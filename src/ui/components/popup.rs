//! Popup Components
//!
//! Confirmation dialog and help overlay.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap},
};

/// Fixed size centered rectangle
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

/// Confirmation dialog
pub struct ConfirmDialog<'a> {
    title: &'a str,
    message: &'a str,
}

impl<'a> ConfirmDialog<'a> {
    pub fn new(title: &'a str, message: &'a str) -> Self {
        Self { title, message }
    }
}

impl Widget for ConfirmDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup_area = centered_rect_fixed(40, 7, area);

        Clear.render(popup_area, buf);

        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow))
            .style(Style::default().bg(Color::Black));

        let inner = block.inner(popup_area);
        block.render(popup_area, buf);

        Paragraph::new(self.message)
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: true })
            .render(Rect::new(inner.x, inner.y, inner.width, inner.height.min(2)), buf);

        if inner.height <= 3 {
            return;
        }

        let hint = Line::from(vec![
            Span::styled("[y]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Yes  "),
            Span::styled("[n]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" No"),
        ]);
        buf.set_line(inner.x, inner.y + 3, &hint, inner.width);
    }
}

/// Scrollable help screen state
#[derive(Debug, Default)]
pub struct HelpState {
    pub scroll: usize,
}

impl HelpState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.scroll = self.scroll.saturating_sub(amount);
    }

    pub fn scroll_down(&mut self, amount: usize, max_scroll: usize) {
        self.scroll = (self.scroll + amount).min(max_scroll);
    }
}

/// Help screen widget
pub struct HelpScreen<'a> {
    state: &'a HelpState,
}

impl<'a> HelpScreen<'a> {
    pub fn new(state: &'a HelpState) -> Self {
        Self { state }
    }

    pub fn popup_area(area: Rect) -> Rect {
        centered_rect_fixed(54, area.height.saturating_sub(4).min(24), area)
    }

    /// Header + bindings per section, blank line between sections
    pub fn content_height() -> usize {
        build_help_lines(&help_sections()).len()
    }

    pub fn max_scroll(area: Rect) -> usize {
        let visible = Self::popup_area(area).height.saturating_sub(2) as usize;
        Self::content_height().saturating_sub(visible)
    }
}

impl Widget for HelpScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = Self::popup_area(area);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Help ")
            .title_bottom(Line::from(" j/k scroll • q close ").centered())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Magenta))
            .style(Style::default().bg(Color::Black));

        let inner = block.inner(popup);
        block.render(popup, buf);

        let sections = help_sections();
        let lines = build_help_lines(&sections);
        for (i, line) in lines.iter().enumerate().skip(self.state.scroll) {
            let y = inner.y + (i - self.state.scroll) as u16;
            if y >= inner.y + inner.height {
                break;
            }
            render_help_line(inner.x + 1, y, inner.width.saturating_sub(1), line, buf);
        }
    }
}

enum HelpLine<'a> {
    Header(&'a str),
    Binding(&'a str, &'a str),
    Empty,
}

type Section = (&'static str, Vec<(&'static str, &'static str)>);

fn build_help_lines<'a>(sections: &'a [Section]) -> Vec<HelpLine<'a>> {
    let mut lines = Vec::new();

    for (i, (header, bindings)) in sections.iter().enumerate() {
        lines.push(HelpLine::Header(header));
        for (key, desc) in bindings {
            lines.push(HelpLine::Binding(key, desc));
        }
        if i < sections.len() - 1 {
            lines.push(HelpLine::Empty);
        }
    }

    lines
}

fn render_help_line(x: u16, y: u16, width: u16, line: &HelpLine<'_>, buf: &mut Buffer) {
    match line {
        HelpLine::Header(title) => {
            buf.set_string(x, y, *title, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        }
        HelpLine::Binding(key, desc) => {
            buf.set_string(x + 2, y, *key, Style::default().fg(Color::Cyan));
            let desc_width = width.saturating_sub(16) as usize;
            let truncated: String = desc.chars().take(desc_width).collect();
            buf.set_string(x + 16, y, &truncated, Style::default().fg(Color::Gray));
        }
        HelpLine::Empty => {}
    }
}

fn help_sections() -> Vec<Section> {
    vec![
        (
            "Views",
            vec![
                ("1", "Sign in"),
                ("2", "Recommendations"),
                ("3", "Calendar"),
                ("4", "Language"),
                ("Tab", "Next view"),
            ],
        ),
        (
            "Sign in",
            vec![
                ("i / Enter", "Edit form"),
                ("Tab", "Next field"),
                ("Ctrl-s", "Show / hide password"),
                ("Enter", "Submit"),
                ("Esc", "Stop editing"),
            ],
        ),
        (
            "Lists",
            vec![
                ("j / k", "Move down / up"),
                ("gg / G", "Top / bottom"),
                ("Enter", "Choose"),
                ("r", "Reload recommendations"),
            ],
        ),
        (
            "Calendar",
            vec![
                ("h / l", "Previous / next day"),
                ("j / k", "Next / previous week"),
                ("[ / ]", "Previous / next month"),
                ("t", "Today"),
                ("Enter", "Select date"),
            ],
        ),
        (
            "Commands",
            vec![
                (":avatar URL", "Set profile picture"),
                (":lang CODE", "Switch language"),
                (":logout", "Sign out"),
                (":refresh", "Reload recommendations"),
                (":q", "Quit"),
            ],
        ),
    ]
}
