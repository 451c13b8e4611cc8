//! UI Components
//!
//! Widgets and their state for each portal view.

pub mod calendar;
pub mod language;
pub mod login;
pub mod popup;
pub mod recommendations;
pub mod statusline;

// Re-exports
pub use calendar::{CalendarOutcome, CalendarState, CalendarWidget};
pub use language::{LanguagePanel, LanguagePanelWidget};
pub use login::{LoginForm, LoginFormWidget};
pub use popup::{ConfirmDialog, HelpScreen, HelpState};
pub use recommendations::{RecommendationsList, RecommendationsState};
pub use statusline::{HelpBar, MessageType, StatusLine};
