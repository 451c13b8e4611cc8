//! Input Handler
//!
//! Processes key events and dispatches to the mode's keymap.

use crossterm::event::KeyEvent;

use super::keymap::{
    confirm_action, form_action, help_action, normal_mode_action, text_input_action, Action,
};
use super::modes::{InputMode, ModeState};

/// Input handler that processes key events based on current mode
pub struct InputHandler;

impl InputHandler {
    /// Process a key event and return the resulting action.
    ///
    /// Command line edits are applied to `state` directly; form edits are
    /// returned for the caller to apply to the focused field.
    pub fn handle_key_event(key: KeyEvent, state: &mut ModeState) -> Action {
        match state.mode {
            InputMode::Normal => {
                let (action, new_pending) = normal_mode_action(key, state.pending);
                state.pending = new_pending;
                action
            }
            InputMode::Insert => form_action(key),
            InputMode::Command => {
                let action = text_input_action(key);
                match action {
                    Action::InsertChar(c) => {
                        state.insert_char(c);
                        Action::None
                    }
                    Action::DeleteChar => {
                        state.delete_char();
                        Action::None
                    }
                    Action::DeleteCharForward => {
                        state.delete_char_forward();
                        Action::None
                    }
                    Action::CursorLeft => {
                        state.cursor_left();
                        Action::None
                    }
                    Action::CursorRight => {
                        state.cursor_right();
                        Action::None
                    }
                    Action::CursorHome => {
                        state.cursor_home();
                        Action::None
                    }
                    Action::CursorEnd => {
                        state.cursor_end();
                        Action::None
                    }
                    Action::ClearLine => {
                        state.clear_buffer();
                        Action::None
                    }
                    Action::Submit => {
                        let buffer = state.get_buffer().to_string();
                        state.to_normal();
                        Action::ExecuteCommand(buffer)
                    }
                    Action::Cancel => {
                        state.to_normal();
                        Action::Cancel
                    }
                    other => other,
                }
            }
            InputMode::Confirm => confirm_action(key),
            InputMode::Help => help_action(key),
        }
    }
}
