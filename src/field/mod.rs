//! Masked Input
//!
//! Text input that masks its content once typing has gone quiet.
//!
//! Every keystroke shows the raw value and (re)arms a single masking
//! deadline. The event loop calls [`MaskedInput::tick`] with the current
//! instant; once the deadline has passed the field switches to a masked
//! display. A new keystroke replaces the pending deadline, so an older
//! deadline can never mask newer input.

use std::time::{Duration, Instant};

use zeroize::Zeroize;

/// Quiet period after the last keystroke before the value is masked
pub const DEFAULT_MASK_DELAY: Duration = Duration::from_millis(1000);

/// Placeholder glyph used for masked characters
pub const MASK_CHAR: char = '*';

/// Display state of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    /// Raw value visible, masking deadline pending (or nothing typed yet)
    Editing,
    /// Value replaced by mask glyphs
    Masked,
    /// Raw value forced visible by the reveal toggle
    Revealed,
}

/// Single-line input with optional deferred masking
#[derive(Debug, Clone)]
pub struct MaskedInput {
    label: &'static str,
    raw: String,
    /// Cursor position in chars
    cursor: usize,
    revealed: bool,
    mask_delay: Option<Duration>,
    mask_deadline: Option<Instant>,
    error: bool,
    focused: bool,
}

impl MaskedInput {
    /// Plain text field, never masked
    pub fn plain(label: &'static str) -> Self {
        Self {
            label,
            raw: String::new(),
            cursor: 0,
            revealed: false,
            mask_delay: None,
            mask_deadline: None,
            error: false,
            focused: false,
        }
    }

    /// Field masked after `delay` of inactivity
    pub fn masked(label: &'static str, delay: Duration) -> Self {
        let mut field = Self::plain(label);
        field.mask_delay = Some(delay);
        field
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn value(&self) -> &str {
        &self.raw
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mask_delay(&self) -> Option<Duration> {
        self.mask_delay
    }

    pub fn is_masking(&self) -> bool {
        self.mask_delay.is_some()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    /// Pending masking deadline, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.mask_deadline
    }

    pub fn state(&self) -> FieldState {
        if self.revealed {
            FieldState::Revealed
        } else if self.mask_delay.is_none() || self.mask_deadline.is_some() || self.raw.is_empty() {
            FieldState::Editing
        } else {
            FieldState::Masked
        }
    }

    /// Text to draw for the current state
    pub fn display(&self) -> String {
        match self.state() {
            FieldState::Masked => MASK_CHAR.to_string().repeat(self.raw.chars().count()),
            FieldState::Editing | FieldState::Revealed => self.raw.clone(),
        }
    }

    pub fn insert_char(&mut self, c: char, now: Instant) {
        let at = self.byte_index(self.cursor);
        self.raw.insert(at, c);
        self.cursor += 1;
        self.keystroke(now);
    }

    /// Backspace
    pub fn delete_char(&mut self, now: Instant) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.raw.remove(at);
        self.keystroke(now);
    }

    /// Delete key
    pub fn delete_char_forward(&mut self, now: Instant) {
        if self.cursor >= self.char_len() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.raw.remove(at);
        self.keystroke(now);
    }

    pub fn clear(&mut self, now: Instant) {
        self.raw.zeroize();
        self.cursor = 0;
        self.keystroke(now);
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Fire the masking deadline if it has passed.
    ///
    /// Returns true when the display changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.mask_deadline {
            Some(deadline) if now >= deadline => {
                self.mask_deadline = None;
                !self.revealed && !self.raw.is_empty()
            }
            _ => false,
        }
    }

    /// Flip between the raw value and the previous display mode.
    ///
    /// A pending deadline is left untouched.
    pub fn toggle_reveal(&mut self) {
        self.revealed = !self.revealed;
    }

    /// Non-empty check run at submission time; sets the error flag
    pub fn validate_required(&mut self) -> bool {
        self.error = self.raw.is_empty();
        !self.error
    }

    /// Gaining focus clears a previous validation error
    pub fn focus(&mut self) {
        self.focused = true;
        self.error = false;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    fn keystroke(&mut self, now: Instant) {
        self.mask_deadline = self.mask_delay.map(|delay| now + delay);
    }

    fn char_len(&self) -> usize {
        self.raw.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.raw
            .char_indices()
            .nth(char_idx)
            .map_or(self.raw.len(), |(i, _)| i)
    }
}

impl Drop for MaskedInput {
    fn drop(&mut self) {
        self.raw.zeroize();
    }
}
