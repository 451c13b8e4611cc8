//! Input Modes
//!
//! Modal editing state machine for the vim-style interface.

/// Input mode enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Editing the sign-in form
    Insert,
    /// Command line mode (:)
    Command,
    /// Confirmation dialog
    Confirm,
    /// Help screen
    Help,
}

impl InputMode {
    /// Get mode indicator for status line
    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Command => "COMMAND",
            Self::Confirm => "CONFIRM",
            Self::Help => "HELP",
        }
    }

    /// Check if mode edits the command buffer
    pub fn is_command_input(&self) -> bool {
        matches!(self, Self::Command)
    }
}

/// Mode state with associated data
#[derive(Debug, Clone)]
pub struct ModeState {
    /// Current mode
    pub mode: InputMode,
    /// Command line buffer
    pub buffer: String,
    /// Cursor position in buffer, in chars
    pub cursor: usize,
    /// Pending key sequence (for multi-key commands like gg)
    pub pending: Option<char>,
}

impl Default for ModeState {
    fn default() -> Self {
        Self {
            mode: InputMode::Normal,
            buffer: String::new(),
            cursor: 0,
            pending: None,
        }
    }
}

impl ModeState {
    /// Create new mode state
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to a new mode
    pub fn set_mode(&mut self, mode: InputMode) {
        self.mode = mode;
        self.buffer.clear();
        self.cursor = 0;
        self.pending = None;
    }

    pub fn to_normal(&mut self) {
        self.set_mode(InputMode::Normal);
    }

    pub fn to_insert(&mut self) {
        self.set_mode(InputMode::Insert);
    }

    pub fn to_command(&mut self) {
        self.set_mode(InputMode::Command);
    }

    pub fn to_confirm(&mut self) {
        self.set_mode(InputMode::Confirm);
    }

    pub fn to_help(&mut self) {
        self.set_mode(InputMode::Help);
    }

    /// Insert character at cursor
    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
    }

    /// Delete character before cursor (backspace)
    pub fn delete_char(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.buffer.remove(at);
        }
    }

    /// Delete character at cursor (delete key)
    pub fn delete_char_forward(&mut self) {
        if self.cursor < self.buffer.chars().count() {
            let at = self.byte_index(self.cursor);
            self.buffer.remove(at);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < self.buffer.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.buffer.chars().count();
    }

    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn get_buffer(&self) -> &str {
        &self.buffer
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_idx)
            .map_or(self.buffer.len(), |(i, _)| i)
    }
}
