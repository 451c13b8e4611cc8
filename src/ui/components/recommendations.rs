//! Recommendations View
//!
//! Article list fed by the recommendations endpoint.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, StatefulWidget, Widget},
};

use crate::api::Article;

#[derive(Debug, Clone, Default)]
pub struct RecommendationsState {
    articles: Vec<Article>,
    pub loading: bool,
    list_state: ListState,
}

impl RecommendationsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn set_articles(&mut self, articles: Vec<Article>) {
        self.articles = articles;
        self.loading = false;
        let selected = compute_selection_after_total_change(self.selected(), self.articles.len());
        self.list_state.select(selected);
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.selected().and_then(|i| self.articles.get(i))
    }

    pub fn move_up(&mut self) {
        if self.articles.is_empty() {
            return;
        }
        let index = self.selected().unwrap_or(0).saturating_sub(1);
        self.list_state.select(Some(index));
    }

    pub fn move_down(&mut self) {
        if self.articles.is_empty() {
            return;
        }
        let index = self.selected().map_or(0, |i| (i + 1).min(self.articles.len() - 1));
        self.list_state.select(Some(index));
    }

    pub fn move_to_top(&mut self) {
        if !self.articles.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn move_to_bottom(&mut self) {
        if !self.articles.is_empty() {
            self.list_state.select(Some(self.articles.len() - 1));
        }
    }
}

fn compute_selection_after_total_change(selected: Option<usize>, total: usize) -> Option<usize> {
    if total == 0 {
        return None;
    }
    match selected {
        Some(sel) if sel >= total => Some(total - 1),
        Some(sel) => Some(sel),
        None => Some(0),
    }
}

pub struct RecommendationsList<'a> {
    block: Option<Block<'a>>,
}

impl<'a> RecommendationsList<'a> {
    pub fn new() -> Self {
        Self { block: None }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl StatefulWidget for RecommendationsList<'_> {
    type State = RecommendationsState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };
        if inner.is_empty() {
            return;
        }

        if state.articles.is_empty() {
            let text = if state.loading {
                "Loading recommendations…"
            } else {
                "No recommendations right now"
            };
            let x = inner.x + inner.width.saturating_sub(text.chars().count() as u16) / 2;
            let y = inner.y + inner.height / 2;
            buf.set_string(x, y, text, Style::default().fg(Color::DarkGray));
            return;
        }

        let items: Vec<ListItem<'_>> = state
            .articles
            .iter()
            .map(|article| {
                let mut lines = vec![Line::from(Span::styled(
                    article.display_title(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ))];
                let detail = article
                    .summary
                    .as_deref()
                    .or(article.url.as_deref())
                    .unwrap_or_default();
                if !detail.is_empty() {
                    lines.push(Line::from(Span::styled(
                        format!("  {detail}"),
                        Style::default().fg(Color::Gray),
                    )));
                }
                ListItem::new(lines)
            })
            .collect();

        let list = List::new(items)
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("▶ ");
        StatefulWidget::render(list, inner, buf, &mut state.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn articles(n: usize) -> Vec<Article> {
        (0..n)
            .map(|i| Article {
                id: Some(i as u64),
                title: format!("Article {i}"),
                ..Article::default()
            })
            .collect()
    }

    #[test]
    fn test_navigation() {
        let mut state = RecommendationsState::new();
        state.set_articles(articles(3));
        assert_eq!(state.selected(), Some(0));

        state.move_down();
        state.move_down();
        state.move_down();
        assert_eq!(state.selected(), Some(2));

        state.move_to_top();
        assert_eq!(state.selected_article().map(|a| a.title.as_str()), Some("Article 0"));
    }

    #[test]
    fn test_reload_keeps_selection_in_range() {
        let mut state = RecommendationsState::new();
        state.set_articles(articles(5));
        state.move_to_bottom();
        state.set_articles(articles(2));
        assert_eq!(state.selected(), Some(1));

        state.set_articles(Vec::new());
        assert_eq!(state.selected(), None);
        state.move_down();
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn test_loading_cleared_by_results() {
        let mut state = RecommendationsState::new();
        state.loading = true;
        state.set_articles(Vec::new());
        assert!(!state.loading);
    }
}
