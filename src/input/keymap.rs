//! Keymap
//!
//! Vim-style key bindings mapped to actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::i18n::Language;
use crate::ui::View;

/// Actions that can be triggered by key presses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Navigation
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MoveToTop,
    MoveToBottom,
    PrevMonth,
    NextMonth,
    Today,

    // Views
    ShowView(View),
    NextView,

    // Selection
    Select,
    Back,

    // Session
    EditLogin,
    Logout,
    SetAvatar(String),
    SetLanguage(Language),
    Refresh,

    // Mode changes
    EnterCommand,
    ShowHelp,

    // Commands
    ExecuteCommand(String),
    Unknown(String),

    // Confirmation
    Confirm,
    Cancel,

    // Application
    Quit,
    ForceQuit,

    // Text input
    InsertChar(char),
    DeleteChar,
    DeleteCharForward,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    ClearLine,
    NextField,
    PrevField,
    ToggleReveal,
    Submit,

    // No action
    None,
}

/// Map key event to action in normal mode
pub fn normal_mode_action(key: KeyEvent, pending: Option<char>) -> (Action, Option<char>) {
    match (key.code, key.modifiers, pending) {
        // Views
        (KeyCode::Char('1'), _, _) => (Action::ShowView(View::Login), None),
        (KeyCode::Char('2'), _, _) => (Action::ShowView(View::Home), None),
        (KeyCode::Char('3'), _, _) => (Action::ShowView(View::Calendar), None),
        (KeyCode::Char('4'), _, _) => (Action::ShowView(View::Settings), None),
        (KeyCode::Tab, _, _) => (Action::NextView, None),

        // Navigation
        (KeyCode::Char('j') | KeyCode::Down, _, _) => (Action::MoveDown, None),
        (KeyCode::Char('k') | KeyCode::Up, _, _) => (Action::MoveUp, None),
        (KeyCode::Char('h') | KeyCode::Left, _, _) => (Action::MoveLeft, None),
        (KeyCode::Char('l') | KeyCode::Right, _, _) => (Action::MoveRight, None),
        (KeyCode::Char('g'), _, None) => (Action::None, Some('g')),
        (KeyCode::Char('g'), _, Some('g')) => (Action::MoveToTop, None),
        (KeyCode::Char('G'), _, _) => (Action::MoveToBottom, None),
        (KeyCode::Char('['), _, _) => (Action::PrevMonth, None),
        (KeyCode::Char(']'), _, _) => (Action::NextMonth, None),
        (KeyCode::Char('t'), _, _) => (Action::Today, None),

        // Selection
        (KeyCode::Enter, _, _) => (Action::Select, None),
        (KeyCode::Esc, _, _) => (Action::Back, None),

        // Session
        (KeyCode::Char('i'), _, _) => (Action::EditLogin, None),
        (KeyCode::Char('r'), _, _) => (Action::Refresh, None),
        (KeyCode::Char('L'), _, _) => (Action::Logout, None),

        // Mode changes
        (KeyCode::Char(':'), _, _) => (Action::EnterCommand, None),
        (KeyCode::Char('?'), _, _) => (Action::ShowHelp, None),

        // Application
        (KeyCode::Char('q'), _, _) => (Action::Quit, None),
        (KeyCode::Char('Q'), _, _) => (Action::ForceQuit, None),
        (KeyCode::Char('c'), KeyModifiers::CONTROL, _) => (Action::ForceQuit, None),

        _ => (Action::None, None),
    }
}

/// Map key event to action on the command line
pub fn text_input_action(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => Action::Cancel,
        (KeyCode::Enter, _) => Action::Submit,
        (KeyCode::Backspace, _) => Action::DeleteChar,
        (KeyCode::Delete, _) => Action::DeleteCharForward,
        (KeyCode::Left, _) => Action::CursorLeft,
        (KeyCode::Right, _) => Action::CursorRight,
        (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => Action::CursorHome,
        (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => Action::CursorEnd,
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => Action::ClearLine,
        (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => Action::InsertChar(c),
        _ => Action::None,
    }
}

/// Map key event to action while editing the sign-in form
pub fn form_action(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Tab, KeyModifiers::NONE) | (KeyCode::Down, _) => Action::NextField,
        (KeyCode::BackTab, _) | (KeyCode::Up, _) => Action::PrevField,
        (KeyCode::Char('s'), KeyModifiers::CONTROL) => Action::ToggleReveal,
        _ => text_input_action(key),
    }
}

/// Map key event to action in confirm mode
pub fn confirm_action(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Action::Confirm,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Action::Cancel,
        _ => Action::None,
    }
}

/// Map key event to action in help mode
pub fn help_action(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Action::Back,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        _ => Action::None,
    }
}

/// Parse command string into action
pub fn parse_command(cmd: &str) -> Action {
    let cmd = cmd.trim();
    let (command, args) = match cmd.split_once(' ') {
        Some((command, args)) => (command, args.trim()),
        None => (cmd, ""),
    };

    match (command, args) {
        ("q" | "quit", _) => Action::Quit,
        ("q!" | "quit!", _) => Action::ForceQuit,
        ("login" | "signin", _) => Action::EditLogin,
        ("logout" | "signout", _) => Action::Logout,
        ("home" | "articles", _) => Action::ShowView(View::Home),
        ("cal" | "calendar", _) => Action::ShowView(View::Calendar),
        ("lang" | "language", "") | ("settings", _) => Action::ShowView(View::Settings),
        ("lang" | "language", code) => match code.parse() {
            Ok(language) => Action::SetLanguage(language),
            Err(_) => Action::Unknown(cmd.to_string()),
        },
        ("avatar", url) if !url.is_empty() => Action::SetAvatar(url.to_string()),
        ("refresh" | "r", _) => Action::Refresh,
        ("help" | "h", _) => Action::ShowHelp,
        ("", _) => Action::None,
        _ => Action::Unknown(cmd.to_string()),
    }
}
