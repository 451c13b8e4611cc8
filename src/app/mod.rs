//! Application State
//!
//! Ties together the views, the event bus and background requests.

pub mod config;

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{KeyEvent, KeyEventKind};
use ratatui::layout::Rect;
use ratatui::Frame;

use crate::api::{Article, Portal};
use crate::events::{AppEvent, EventBus, Subscription};
use crate::input::{parse_command, Action, InputHandler, InputMode, ModeState};
use crate::ui::components::{
    CalendarOutcome, CalendarState, HelpScreen, HelpState, LanguagePanel, LoginForm, MessageType,
    RecommendationsState,
};
use crate::ui::{Renderer, UiState, View};

pub use config::{AppConfig, PendingAction};

const MESSAGE_TTL: Duration = Duration::from_secs(5);

/// Results reported by background requests
#[derive(Debug)]
enum WorkerResult {
    Recommendations(Vec<Article>),
    Login {
        username: String,
        result: Result<(), String>,
    },
}

/// Who is signed in, as seen by the status line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub signed_in: bool,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

impl Session {
    pub fn display_name(&self) -> String {
        match (&self.username, self.signed_in) {
            (Some(name), true) => name.clone(),
            (None, true) => "signed in".to_string(),
            (_, false) => "guest".to_string(),
        }
    }
}

/// Main application state
pub struct App {
    pub config: AppConfig,
    pub mode_state: ModeState,
    pub view: View,
    pub terminal_size: Rect,
    pub session: Session,
    pub login_form: LoginForm,
    pub recommendations: RecommendationsState,
    pub calendar: CalendarState,
    pub languages: LanguagePanel,
    pub help_state: HelpState,
    pub message: Option<(String, MessageType, Instant)>,
    pub pending_action: Option<PendingAction>,
    pub should_quit: bool,
    bus: EventBus,
    events: Subscription,
    portal: Arc<dyn Portal>,
    worker_tx: Sender<WorkerResult>,
    worker_rx: Receiver<WorkerResult>,
}

impl App {
    pub fn new(config: AppConfig, portal: Arc<dyn Portal>) -> Self {
        let mut bus = EventBus::new();
        let events = bus.subscribe();
        let (worker_tx, worker_rx) = mpsc::channel();
        let today = chrono::Local::now().date_naive();

        let mut app = Self {
            mode_state: ModeState::new(),
            view: View::Home,
            terminal_size: Rect::default(),
            session: Session::default(),
            login_form: LoginForm::new(config.mask_delay),
            recommendations: RecommendationsState::new(),
            calendar: CalendarState::new(today),
            languages: LanguagePanel::new(config.language),
            help_state: HelpState::new(),
            message: None,
            pending_action: None,
            should_quit: false,
            bus,
            events,
            portal,
            worker_tx,
            worker_rx,
            config,
        };

        if !app.config.guest {
            app.edit_login();
        }
        app
    }

    /// Kick off the initial recommendations request
    pub fn start(&mut self) {
        self.refresh_recommendations();
    }

    /// Next instant the event loop must wake for, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.login_form.next_deadline()
    }

    /// Advance timers and apply pending background results and events
    pub fn tick(&mut self, now: Instant) {
        self.login_form.tick(now);
        self.check_message_expiry(now);

        while let Ok(result) = self.worker_rx.try_recv() {
            self.apply_worker_result(result, now);
        }
        self.process_events(now);
    }

    /// Render the application
    pub fn render(&mut self, frame: &mut Frame<'_>) {
        self.terminal_size = frame.area();

        let message = self.message.as_ref().map(|(m, t, _)| (m.as_str(), *t));
        let command_buffer = if self.mode_state.mode.is_command_input() {
            Some(self.mode_state.get_buffer())
        } else {
            None
        };
        let confirm_message = self.pending_action.as_ref().map(PendingAction::confirm_message);

        let mut state = UiState {
            view: self.view,
            mode: self.mode_state.mode,
            session: &self.session,
            login_form: &self.login_form,
            recommendations: &mut self.recommendations,
            calendar: &self.calendar,
            languages: &self.languages,
            command_buffer,
            message,
            confirm_message,
            help_state: &self.help_state,
        };

        Renderer::render(frame, &mut state);
    }

    pub fn set_message(&mut self, msg: &str, msg_type: MessageType, now: Instant) {
        self.message = Some((msg.to_string(), msg_type, now));
    }

    fn check_message_expiry(&mut self, now: Instant) {
        if let Some((_, _, time)) = &self.message {
            if now.saturating_duration_since(*time) > MESSAGE_TTL {
                self.message = None;
            }
        }
    }

    /// Handle key event
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        let action = InputHandler::handle_key_event(key, &mut self.mode_state);
        match self.mode_state.mode {
            InputMode::Insert => self.handle_form_action(action, now),
            InputMode::Help => self.handle_help_action(action),
            _ => self.execute_action(action, now),
        }
    }

    fn handle_help_action(&mut self, action: Action) {
        let max = HelpScreen::max_scroll(self.terminal_size);
        match action {
            Action::MoveDown => self.help_state.scroll_down(1, max),
            Action::MoveUp => self.help_state.scroll_up(1),
            Action::Back => self.mode_state.to_normal(),
            _ => {}
        }
    }

    fn handle_form_action(&mut self, action: Action, now: Instant) {
        if self.login_form.submitting && action != Action::Cancel {
            return;
        }

        match action {
            Action::NextField => self.login_form.next_field(),
            Action::PrevField => self.login_form.prev_field(),
            Action::ToggleReveal => self.login_form.toggle_password_visibility(),
            Action::Submit => self.submit_login(now),
            Action::Cancel => self.mode_state.to_normal(),
            edit => {
                let field = self.login_form.active_field_mut();
                match edit {
                    Action::InsertChar(c) => field.insert_char(c, now),
                    Action::DeleteChar => field.delete_char(now),
                    Action::DeleteCharForward => field.delete_char_forward(now),
                    Action::CursorLeft => field.cursor_left(),
                    Action::CursorRight => field.cursor_right(),
                    Action::CursorHome => field.cursor_home(),
                    Action::CursorEnd => field.cursor_end(),
                    Action::ClearLine => field.clear(now),
                    _ => {}
                }
            }
        }
    }

    fn execute_action(&mut self, action: Action, now: Instant) {
        match action {
            Action::ShowView(view) => self.show_view(view),
            Action::NextView => self.show_view(self.view.next()),

            Action::MoveUp => match self.view {
                View::Home => self.recommendations.move_up(),
                View::Calendar => self.calendar.move_weeks(-1),
                View::Settings => self.languages.move_up(),
                View::Login => {}
            },
            Action::MoveDown => match self.view {
                View::Home => self.recommendations.move_down(),
                View::Calendar => self.calendar.move_weeks(1),
                View::Settings => self.languages.move_down(),
                View::Login => {}
            },
            Action::MoveLeft if self.view == View::Calendar => self.calendar.move_days(-1),
            Action::MoveRight if self.view == View::Calendar => self.calendar.move_days(1),
            Action::MoveToTop => match self.view {
                View::Home => self.recommendations.move_to_top(),
                View::Settings => self.languages.move_to_top(),
                _ => {}
            },
            Action::MoveToBottom => match self.view {
                View::Home => self.recommendations.move_to_bottom(),
                View::Settings => self.languages.move_to_bottom(),
                _ => {}
            },
            Action::PrevMonth if self.view == View::Calendar => self.calendar.prev_month(),
            Action::NextMonth if self.view == View::Calendar => self.calendar.next_month(),
            Action::Today if self.view == View::Calendar => self.calendar.go_today(),

            Action::Select => self.select(now),

            Action::EditLogin => self.edit_login(),
            Action::Logout => {
                if self.session.signed_in {
                    self.pending_action = Some(PendingAction::Logout);
                    self.mode_state.to_confirm();
                } else {
                    self.set_message("Not signed in", MessageType::Warning, now);
                }
            }
            Action::SetAvatar(url) => {
                self.bus.publish(AppEvent::AvatarUpdated { headshot_url: url });
            }
            Action::SetLanguage(language) => self.change_language(language),
            Action::Refresh => self.refresh_recommendations(),

            Action::EnterCommand => self.mode_state.to_command(),
            Action::ShowHelp => {
                self.help_state.scroll = 0;
                self.mode_state.to_help();
            }
            Action::ExecuteCommand(cmd) => self.execute_action(parse_command(&cmd), now),
            Action::Unknown(cmd) => {
                self.set_message(&format!("Unknown command: {cmd}"), MessageType::Error, now);
            }

            Action::Confirm => {
                self.mode_state.to_normal();
                match self.pending_action.take() {
                    Some(PendingAction::Logout) => {
                        self.bus.publish(AppEvent::AuthChanged {
                            signed_in: false,
                            username: None,
                        });
                    }
                    Some(PendingAction::Quit) => self.should_quit = true,
                    None => {}
                }
            }
            Action::Cancel => {
                self.pending_action = None;
                self.mode_state.to_normal();
            }

            Action::Quit => {
                self.pending_action = Some(PendingAction::Quit);
                self.mode_state.to_confirm();
            }
            Action::ForceQuit => self.should_quit = true,

            _ => {}
        }
    }

    fn show_view(&mut self, view: View) {
        self.view = view;
        if view == View::Login {
            self.mode_state.to_insert();
        }
    }

    fn edit_login(&mut self) {
        self.view = View::Login;
        self.mode_state.to_insert();
    }

    fn select(&mut self, now: Instant) {
        match self.view {
            View::Login => self.edit_login(),
            View::Home => {
                let target = self
                    .recommendations
                    .selected_article()
                    .map(|a| a.url.clone().unwrap_or_else(|| a.display_title().to_string()));
                if let Some(target) = target {
                    self.set_message(&target, MessageType::Info, now);
                }
            }
            View::Calendar => {
                let CalendarOutcome::Selected(date) = self.calendar.select();
                tracing::debug!(%date, "date selected");
                self.set_message(
                    &format!("Selected {}", date.format("%A, %d %B %Y")),
                    MessageType::Success,
                    now,
                );
            }
            View::Settings => {
                if let Some(language) = self.languages.choose() {
                    self.bus.publish(AppEvent::LanguageChanged { language });
                }
            }
        }
    }

    fn change_language(&mut self, language: crate::i18n::Language) {
        if self.languages.set_current(language).is_some() {
            self.bus.publish(AppEvent::LanguageChanged { language });
        }
    }

    fn submit_login(&mut self, now: Instant) {
        let Some(submission) = self.login_form.submit(self.config.csrf_token()) else {
            self.set_message("Please fill in the required fields", MessageType::Error, now);
            return;
        };

        if self.config.csrf_token.is_none() {
            tracing::warn!("submitting login without an anti-forgery token");
        }

        self.set_message("Signing in…", MessageType::Info, now);
        let portal = Arc::clone(&self.portal);
        let tx = self.worker_tx.clone();
        thread::spawn(move || {
            let result = portal.login(&submission).map_err(|e| e.to_string());
            let _ = tx.send(WorkerResult::Login {
                username: submission.username.clone(),
                result,
            });
        });
    }

    fn refresh_recommendations(&mut self) {
        if self.recommendations.loading {
            return;
        }
        self.recommendations.loading = true;

        let portal = Arc::clone(&self.portal);
        let tx = self.worker_tx.clone();
        thread::spawn(move || {
            let _ = tx.send(WorkerResult::Recommendations(portal.recommendations()));
        });
    }

    fn apply_worker_result(&mut self, result: WorkerResult, now: Instant) {
        match result {
            WorkerResult::Recommendations(articles) => {
                self.recommendations.set_articles(articles);
            }
            WorkerResult::Login { username, result: Ok(()) } => {
                self.login_form.reset();
                self.mode_state.to_normal();
                self.bus.publish(AppEvent::AuthChanged {
                    signed_in: true,
                    username: Some(username),
                });
            }
            WorkerResult::Login { result: Err(e), .. } => {
                self.login_form.fail(now);
                self.set_message(&format!("Sign in failed: {e}"), MessageType::Error, now);
            }
        }
    }

    fn process_events(&mut self, now: Instant) {
        for event in self.events.drain() {
            match event {
                AppEvent::AuthChanged { signed_in: true, username } => {
                    self.session.signed_in = true;
                    self.session.username = username;
                    self.view = View::Home;
                    let msg = match &self.session.username {
                        Some(_) => format!("Signed in as {}", self.session.display_name()),
                        None => "Signed in".to_string(),
                    };
                    self.set_message(&msg, MessageType::Success, now);
                    self.refresh_recommendations();
                }
                AppEvent::AuthChanged { signed_in: false, .. } => {
                    self.session = Session::default();
                    self.set_message("Signed out", MessageType::Info, now);
                    self.edit_login();
                }
                AppEvent::AvatarUpdated { headshot_url } => {
                    self.session.avatar_url = Some(headshot_url);
                    self.set_message("Profile picture updated", MessageType::Success, now);
                }
                AppEvent::LanguageChanged { language } => {
                    self.config.language = language;
                    self.set_message(
                        &format!("Language: {}", language.native_name()),
                        MessageType::Success,
                        now,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use secrecy::ExposeSecret;

    use crate::api::{ApiError, ApiResult, LoginSubmission};
    use crate::i18n::Language;

    #[derive(Default)]
    struct FakePortal {
        articles: Vec<Article>,
        accept_login: bool,
        submissions: Mutex<Vec<(String, String, String)>>,
    }

    impl Portal for FakePortal {
        fn recommendations(&self) -> Vec<Article> {
            self.articles.clone()
        }

        fn login(&self, submission: &LoginSubmission) -> ApiResult<()> {
            self.submissions.lock().unwrap().push((
                submission.username.clone(),
                submission.password.expose_secret().to_string(),
                submission.csrf_token.clone(),
            ));
            if self.accept_login {
                Ok(())
            } else {
                Err(ApiError::Rejected)
            }
        }
    }

    fn config(guest: bool) -> AppConfig {
        AppConfig {
            csrf_token: Some("tok".to_string()),
            guest,
            ..AppConfig::default()
        }
    }

    fn app_with(portal: FakePortal, guest: bool) -> (App, Arc<FakePortal>) {
        let portal = Arc::new(portal);
        let app = App::new(config(guest), portal.clone());
        (app, portal)
    }

    fn press(app: &mut App, code: KeyCode, now: Instant) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), now);
    }

    fn type_str(app: &mut App, s: &str, now: Instant) {
        for c in s.chars() {
            press(app, KeyCode::Char(c), now);
        }
    }

    fn command(app: &mut App, cmd: &str) {
        let now = Instant::now();
        press(app, KeyCode::Char(':'), now);
        type_str(app, cmd, now);
        press(app, KeyCode::Enter, now);
    }

    /// Wait for one background result and apply it
    fn settle(app: &mut App) {
        let result = app.worker_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        app.apply_worker_result(result, Instant::now());
        app.process_events(Instant::now());
    }

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_starts_on_login_form() {
        let (app, _) = app_with(FakePortal::default(), false);
        assert_eq!(app.view, View::Login);
        assert_eq!(app.mode_state.mode, InputMode::Insert);
    }

    #[test]
    fn test_guest_starts_on_home() {
        let (app, _) = app_with(FakePortal::default(), true);
        assert_eq!(app.view, View::Home);
        assert_eq!(app.mode_state.mode, InputMode::Normal);
    }

    #[test]
    fn test_password_masks_on_tick() {
        let (mut app, _) = app_with(FakePortal::default(), false);
        let start = Instant::now();

        press(&mut app, KeyCode::Tab, start);
        type_str(&mut app, "meow", start);
        assert_eq!(app.login_form.password().display(), "meow");

        app.tick(start + Duration::from_millis(500));
        assert_eq!(app.login_form.password().display(), "meow");

        app.tick(start + Duration::from_millis(1000));
        assert_eq!(app.login_form.password().display(), "****");

        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL), start);
        assert_eq!(app.login_form.password().display(), "meow");
    }

    #[test]
    fn test_submit_with_empty_email_flags_email_only() {
        let (mut app, portal) = app_with(FakePortal::default(), false);
        let now = Instant::now();

        press(&mut app, KeyCode::Tab, now);
        type_str(&mut app, "meow", now);
        press(&mut app, KeyCode::Enter, now);

        assert!(app.login_form.username().has_error());
        assert!(!app.login_form.password().has_error());
        assert!(!app.login_form.submitting);
        assert!(portal.submissions.lock().unwrap().is_empty());

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        assert!(buffer_text(terminal.backend().buffer()).contains("Email is required"));

        // Refocusing the email field clears its error
        press(&mut app, KeyCode::BackTab, now);
        assert!(!app.login_form.username().has_error());
    }

    #[test]
    fn test_successful_login_publishes_auth_change() {
        let portal = FakePortal {
            accept_login: true,
            articles: vec![Article {
                title: "Flea season".to_string(),
                ..Article::default()
            }],
            ..FakePortal::default()
        };
        let (mut app, portal) = app_with(portal, false);
        let observer = app.bus.subscribe();
        let now = Instant::now();

        type_str(&mut app, "mia@example.com", now);
        press(&mut app, KeyCode::Tab, now);
        type_str(&mut app, "whiskers", now);
        press(&mut app, KeyCode::Enter, now);
        assert!(app.login_form.submitting);

        settle(&mut app);
        assert_eq!(
            *portal.submissions.lock().unwrap(),
            vec![("mia@example.com".to_string(), "whiskers".to_string(), "tok".to_string())]
        );
        assert!(app.session.signed_in);
        assert_eq!(app.session.display_name(), "mia@example.com");
        assert_eq!(app.view, View::Home);
        assert_eq!(app.login_form.password().value(), "");
        assert_eq!(
            observer.drain(),
            vec![AppEvent::AuthChanged {
                signed_in: true,
                username: Some("mia@example.com".to_string())
            }]
        );

        // Signing in reloads recommendations
        assert!(app.recommendations.loading);
        settle(&mut app);
        assert_eq!(app.recommendations.articles().len(), 1);
    }

    #[test]
    fn test_rejected_login_keeps_email() {
        let (mut app, _) = app_with(FakePortal::default(), false);
        let now = Instant::now();

        type_str(&mut app, "mia", now);
        press(&mut app, KeyCode::Tab, now);
        type_str(&mut app, "wrong", now);
        press(&mut app, KeyCode::Enter, now);
        settle(&mut app);

        assert!(!app.session.signed_in);
        assert_eq!(app.login_form.username().value(), "mia");
        assert_eq!(app.login_form.password().value(), "");
        let (msg, kind, _) = app.message.clone().unwrap();
        assert!(msg.starts_with("Sign in failed"));
        assert_eq!(kind, MessageType::Error);
    }

    #[test]
    fn test_empty_recommendations_render_placeholder() {
        let (mut app, _) = app_with(FakePortal::default(), true);
        app.start();
        settle(&mut app);
        assert!(app.recommendations.articles().is_empty());
        assert!(!app.recommendations.loading);

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        assert!(buffer_text(terminal.backend().buffer()).contains("No recommendations right now"));
    }

    #[test]
    fn test_avatar_command_updates_session() {
        let (mut app, _) = app_with(FakePortal::default(), true);
        command(&mut app, "avatar https://cdn.example/rex.png");
        app.tick(Instant::now());
        assert_eq!(app.session.avatar_url.as_deref(), Some("https://cdn.example/rex.png"));
    }

    #[test]
    fn test_language_selection() {
        let (mut app, _) = app_with(FakePortal::default(), true);
        let now = Instant::now();

        press(&mut app, KeyCode::Char('4'), now);
        press(&mut app, KeyCode::Char('j'), now);
        press(&mut app, KeyCode::Enter, now);
        app.tick(now);
        assert_eq!(app.config.language, Language::TraditionalChinese);

        command(&mut app, "lang ja");
        app.tick(now);
        assert_eq!(app.config.language, Language::Japanese);
        assert_eq!(app.languages.current(), Language::Japanese);
    }

    #[test]
    fn test_calendar_selection_reaches_parent() {
        let (mut app, _) = app_with(FakePortal::default(), true);
        let now = Instant::now();
        let today = app.calendar.today();

        press(&mut app, KeyCode::Char('3'), now);
        press(&mut app, KeyCode::Char('l'), now);
        press(&mut app, KeyCode::Enter, now);

        let expected = today.succ_opt().unwrap();
        assert_eq!(app.calendar.selected(), Some(expected));
        let (msg, _, _) = app.message.clone().unwrap();
        assert!(msg.starts_with("Selected"));
    }

    #[test]
    fn test_logout_requires_confirmation() {
        let (mut app, _) = app_with(FakePortal::default(), true);
        app.session.signed_in = true;
        let now = Instant::now();

        press(&mut app, KeyCode::Char('L'), now);
        assert_eq!(app.mode_state.mode, InputMode::Confirm);
        press(&mut app, KeyCode::Char('y'), now);
        app.tick(now);

        assert!(!app.session.signed_in);
        assert_eq!(app.view, View::Login);
    }

    #[test]
    fn test_quit_confirm_and_cancel() {
        let (mut app, _) = app_with(FakePortal::default(), true);
        let now = Instant::now();

        press(&mut app, KeyCode::Char('q'), now);
        press(&mut app, KeyCode::Char('n'), now);
        assert!(!app.should_quit);
        assert_eq!(app.mode_state.mode, InputMode::Normal);

        press(&mut app, KeyCode::Char('q'), now);
        press(&mut app, KeyCode::Char('y'), now);
        assert!(app.should_quit);
    }

    #[test]
    fn test_unknown_command_reports_error() {
        let (mut app, _) = app_with(FakePortal::default(), true);
        command(&mut app, "bark");
        let (msg, kind, _) = app.message.clone().unwrap();
        assert_eq!(msg, "Unknown command: bark");
        assert_eq!(kind, MessageType::Error);
    }

    #[test]
    fn test_message_expires_on_injected_clock() {
        let (mut app, _) = app_with(FakePortal::default(), true);
        let start = Instant::now();

        press(&mut app, KeyCode::Char('L'), start);
        assert_eq!(app.message.as_ref().map(|(m, _, at)| (m.as_str(), *at)), Some(("Not signed in", start)));

        app.tick(start + MESSAGE_TTL);
        assert!(app.message.is_some());

        app.tick(start + MESSAGE_TTL + Duration::from_millis(1));
        assert!(app.message.is_none());
    }

    #[test]
    fn test_sign_in_without_username_has_no_blank_name() {
        let (mut app, _) = app_with(FakePortal::default(), true);
        let now = Instant::now();

        app.bus.publish(AppEvent::AuthChanged { signed_in: true, username: None });
        app.tick(now);

        assert!(app.session.signed_in);
        assert_eq!(app.session.display_name(), "signed in");
        let (msg, kind, _) = app.message.clone().unwrap();
        assert_eq!(msg, "Signed in");
        assert_eq!(kind, MessageType::Success);
    }
}
