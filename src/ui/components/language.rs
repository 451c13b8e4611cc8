//! Language Settings Panel

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Widget},
};

use super::popup::centered_rect_fixed;
use crate::i18n::Language;

#[derive(Debug, Clone)]
pub struct LanguagePanel {
    highlighted: usize,
    current: Language,
}

impl LanguagePanel {
    pub fn new(current: Language) -> Self {
        let highlighted = Language::ALL.iter().position(|l| *l == current).unwrap_or(0);
        Self { highlighted, current }
    }

    pub fn current(&self) -> Language {
        self.current
    }

    pub fn highlighted(&self) -> Language {
        Language::ALL[self.highlighted]
    }

    pub fn move_up(&mut self) {
        self.highlighted = self.highlighted.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        self.highlighted = (self.highlighted + 1).min(Language::ALL.len() - 1);
    }

    pub fn move_to_top(&mut self) {
        self.highlighted = 0;
    }

    pub fn move_to_bottom(&mut self) {
        self.highlighted = Language::ALL.len() - 1;
    }

    /// Apply the highlighted entry; `Some` only when it differs
    pub fn choose(&mut self) -> Option<Language> {
        self.set_current(self.highlighted())
    }

    pub fn set_current(&mut self, language: Language) -> Option<Language> {
        if language == self.current {
            return None;
        }
        self.current = language;
        self.highlighted = Language::ALL.iter().position(|l| *l == language).unwrap_or(0);
        Some(language)
    }
}

pub struct LanguagePanelWidget<'a> {
    panel: &'a LanguagePanel,
}

impl<'a> LanguagePanelWidget<'a> {
    pub fn new(panel: &'a LanguagePanel) -> Self {
        Self { panel }
    }
}

impl Widget for LanguagePanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let panel_area = centered_rect_fixed(36, Language::ALL.len() as u16 + 4, area);

        let block = Block::default()
            .title(" Language ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Magenta));

        let inner = block.inner(panel_area);
        block.render(panel_area, buf);

        for (i, lang) in Language::ALL.iter().enumerate() {
            let y = inner.y + 1 + i as u16;
            if y >= inner.y + inner.height {
                break;
            }
            let marker = if *lang == self.panel.current { "●" } else { "○" };
            let style = if i == self.panel.highlighted {
                Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let line = Line::from(vec![
                Span::styled(format!(" {marker} "), Style::default().fg(Color::Green)),
                Span::styled(lang.native_name(), style.fg(Color::White)),
                Span::styled(format!("  {}", lang.code()), Style::default().fg(Color::Gray)),
            ]);
            buf.set_line(inner.x, y, &line, inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_current() {
        let panel = LanguagePanel::new(Language::Japanese);
        assert_eq!(panel.highlighted(), Language::Japanese);
    }

    #[test]
    fn test_navigation_clamps() {
        let mut panel = LanguagePanel::new(Language::English);
        panel.move_up();
        assert_eq!(panel.highlighted(), Language::English);
        panel.move_down();
        panel.move_down();
        panel.move_down();
        assert_eq!(panel.highlighted(), Language::Japanese);
        panel.move_to_top();
        assert_eq!(panel.highlighted(), Language::English);
    }

    #[test]
    fn test_choose_reports_changes_only() {
        let mut panel = LanguagePanel::new(Language::English);
        assert_eq!(panel.choose(), None);

        panel.move_down();
        assert_eq!(panel.choose(), Some(Language::TraditionalChinese));
        assert_eq!(panel.current(), Language::TraditionalChinese);
        assert_eq!(panel.choose(), None);
    }
}
