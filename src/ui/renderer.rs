//! Renderer
//!
//! Main rendering logic for the application.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Tabs},
    Frame,
};

use super::components::{
    CalendarState, CalendarWidget, ConfirmDialog, HelpBar, HelpScreen, HelpState, LanguagePanel,
    LanguagePanelWidget, LoginForm, LoginFormWidget, MessageType, RecommendationsList,
    RecommendationsState, StatusLine,
};
use crate::app::Session;
use crate::input::InputMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Home,
    Calendar,
    Settings,
}

impl View {
    pub const ALL: [View; 4] = [Self::Login, Self::Home, Self::Calendar, Self::Settings];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Home => "Recommendations",
            Self::Calendar => "Calendar",
            Self::Settings => "Language",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

pub struct UiState<'a> {
    pub view: View,
    pub mode: InputMode,
    pub session: &'a Session,
    pub login_form: &'a LoginForm,
    pub recommendations: &'a mut RecommendationsState,
    pub calendar: &'a CalendarState,
    pub languages: &'a LanguagePanel,
    pub command_buffer: Option<&'a str>,
    pub message: Option<(&'a str, MessageType)>,
    pub confirm_message: Option<&'a str>,
    pub help_state: &'a HelpState,
}

pub struct Renderer;

impl Renderer {
    pub fn render(frame: &mut Frame<'_>, state: &mut UiState<'_>) {
        let size = frame.area();
        let chunks = create_main_layout(size);

        render_tabs(frame, chunks[0], state.view);
        render_content(frame, chunks[1], state);
        render_status_line(frame, chunks[2], state);
        frame.render_widget(HelpBar::for_mode(state.mode), chunks[3]);
        render_overlays(frame, size, state);
    }
}

fn create_main_layout(size: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(size)
}

fn render_tabs(frame: &mut Frame<'_>, area: Rect, view: View) {
    let titles = View::ALL
        .iter()
        .enumerate()
        .map(|(i, v)| Line::from(format!(" {} {} ", i + 1, v.title())));
    let tabs = Tabs::new(titles)
        .select(view.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD))
        .divider("│");
    frame.render_widget(tabs, area);
}

fn render_content(frame: &mut Frame<'_>, area: Rect, state: &mut UiState<'_>) {
    match state.view {
        View::Login => {
            let editing = state.mode == InputMode::Insert;
            frame.render_widget(LoginFormWidget::new(state.login_form).editing(editing), area);
        }
        View::Home => {
            let block = Block::default()
                .title(" Recommended for you ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Magenta));
            frame.render_stateful_widget(RecommendationsList::new().block(block), area, &mut *state.recommendations);
        }
        View::Calendar => frame.render_widget(CalendarWidget::new(state.calendar), area),
        View::Settings => frame.render_widget(LanguagePanelWidget::new(state.languages), area),
    }
}

fn render_status_line(frame: &mut Frame<'_>, area: Rect, state: &UiState<'_>) {
    let mut status = StatusLine::new(state.mode);

    if let Some(buffer) = state.command_buffer {
        status = status.command_buffer(buffer);
    } else if let Some((msg, msg_type)) = state.message {
        status = status.message(msg, msg_type);
    }

    if let Some(date) = state.calendar.selected() {
        status = status.segment(date.format("%Y-%m-%d").to_string());
    }
    if state.session.avatar_url.is_some() {
        status = status.segment("◉");
    }
    status = status
        .segment(state.session.display_name())
        .segment(state.languages.current().code());

    frame.render_widget(status, area);
}

fn render_overlays(frame: &mut Frame<'_>, area: Rect, state: &UiState<'_>) {
    match state.mode {
        InputMode::Help => frame.render_widget(HelpScreen::new(state.help_state), area),
        InputMode::Confirm => {
            if let Some(msg) = state.confirm_message {
                frame.render_widget(ConfirmDialog::new(" Confirm ", msg), area);
            }
        }
        _ => {}
    }
}
