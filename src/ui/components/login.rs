//! Login Form Component
//!
//! Email + password form posted to the portal's login endpoint.

use std::time::{Duration, Instant};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Widget},
};
use secrecy::SecretString;

use super::popup::centered_rect_fixed;
use crate::api::LoginSubmission;
use crate::field::MaskedInput;

const USERNAME: usize = 0;
const PASSWORD: usize = 1;

/// Login form state
#[derive(Debug, Clone)]
pub struct LoginForm {
    fields: [MaskedInput; 2],
    active_field: usize,
    pub submitting: bool,
}

impl LoginForm {
    pub fn new(mask_delay: Duration) -> Self {
        let mut fields = [
            MaskedInput::plain("Email"),
            MaskedInput::masked("Password", mask_delay),
        ];
        fields[USERNAME].focus();
        Self {
            fields,
            active_field: USERNAME,
            submitting: false,
        }
    }

    pub fn username(&self) -> &MaskedInput {
        &self.fields[USERNAME]
    }

    pub fn password(&self) -> &MaskedInput {
        &self.fields[PASSWORD]
    }

    pub fn fields(&self) -> &[MaskedInput] {
        &self.fields
    }

    pub fn active_index(&self) -> usize {
        self.active_field
    }

    pub fn active_field_mut(&mut self) -> &mut MaskedInput {
        &mut self.fields[self.active_field]
    }

    pub fn focus_field(&mut self, index: usize) {
        self.fields[self.active_field].blur();
        self.active_field = index % self.fields.len();
        self.fields[self.active_field].focus();
        self.fields[self.active_field].cursor_end();
    }

    pub fn next_field(&mut self) {
        self.focus_field(self.active_field + 1);
    }

    pub fn prev_field(&mut self) {
        self.focus_field(self.active_field + self.fields.len() - 1);
    }

    /// Fire due masking deadlines; true when something changed
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for field in &mut self.fields {
            changed |= field.tick(now);
        }
        changed
    }

    /// Earliest pending masking deadline across fields
    pub fn next_deadline(&self) -> Option<Instant> {
        self.fields.iter().filter_map(MaskedInput::next_deadline).min()
    }

    pub fn toggle_password_visibility(&mut self) {
        self.fields[PASSWORD].toggle_reveal();
    }

    /// Validate both fields and build the submission.
    ///
    /// Each empty field gets its own error flag; both are checked even if
    /// the first one fails.
    pub fn submit(&mut self, csrf_token: &str) -> Option<LoginSubmission> {
        let username_ok = self.fields[USERNAME].validate_required();
        let password_ok = self.fields[PASSWORD].validate_required();
        if !(username_ok && password_ok) {
            return None;
        }

        self.submitting = true;
        Some(LoginSubmission {
            username: self.fields[USERNAME].value().to_string(),
            password: SecretString::from(self.fields[PASSWORD].value().to_string()),
            csrf_token: csrf_token.to_string(),
        })
    }

    /// Rejected login: keep the email, drop the password
    pub fn fail(&mut self, now: Instant) {
        self.submitting = false;
        self.fields[PASSWORD].clear(now);
        self.focus_field(PASSWORD);
    }

    pub fn reset(&mut self) {
        let delay = self.fields[PASSWORD].mask_delay().unwrap_or_default();
        *self = Self::new(delay);
    }
}

/// Login form widget
pub struct LoginFormWidget<'a> {
    form: &'a LoginForm,
    editing: bool,
}

impl<'a> LoginFormWidget<'a> {
    pub fn new(form: &'a LoginForm) -> Self {
        Self { form, editing: false }
    }

    pub fn editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }
}

impl Widget for LoginFormWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let form_area = centered_rect_fixed(56, 12, area);
        Clear.render(form_area, buf);

        let border = if self.editing { Color::Magenta } else { Color::DarkGray };
        let block = Block::default()
            .title(" Sign in ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(Color::Black));

        let inner = block.inner(form_area);
        block.render(form_area, buf);
        if inner.is_empty() {
            return;
        }

        let label_width = 11u16;
        let value_x = inner.x + label_width;
        let value_width = inner.width.saturating_sub(label_width + 1);
        let mut y = inner.y + 1;

        // Bottom row belongs to the key hints
        let rows_end = inner.bottom().saturating_sub(1);

        for (i, field) in self.form.fields().iter().enumerate() {
            if y >= rows_end {
                break;
            }
            let is_active = self.editing && i == self.form.active_index();

            let label_style = if is_active {
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            buf.set_string(inner.x + 1, y, format!("{}:", field.label()), label_style);

            let bg = if is_active { Color::DarkGray } else { Color::Black };
            for x in value_x..value_x + value_width {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_bg(bg);
                }
            }

            let display = field.display();
            let value_style = if field.is_masking() {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            };
            buf.set_line(value_x, y, &Line::styled(display.as_str(), value_style.bg(bg)), value_width);

            if is_active {
                let before: String = display.chars().take(field.cursor()).collect();
                let cursor_x = value_x + Span::raw(before).width() as u16;
                if cursor_x < value_x + value_width {
                    if let Some(cell) = buf.cell_mut((cursor_x, y)) {
                        cell.set_style(Style::default().bg(Color::White).fg(Color::Black));
                    }
                }
            }

            if y + 1 >= rows_end {
                break;
            }

            if field.is_masking() {
                let hint = if field.is_revealed() { "shown" } else { "hidden" };
                buf.set_string(
                    value_x + value_width.saturating_sub(hint.len() as u16),
                    y + 1,
                    hint,
                    Style::default().fg(Color::DarkGray),
                );
            }

            if field.has_error() {
                buf.set_string(
                    value_x,
                    y + 1,
                    format!("{} is required", field.label()),
                    Style::default().fg(Color::Red),
                );
            }

            y = y.saturating_add(3);
        }

        let status = if self.form.submitting {
            Line::from(Span::styled("Signing in…", Style::default().fg(Color::Yellow)))
        } else if self.editing {
            Line::from(vec![
                Span::styled("Tab", Style::default().fg(Color::Magenta)),
                Span::raw(" next  "),
                Span::styled("Enter", Style::default().fg(Color::Magenta)),
                Span::raw(" sign in  "),
                Span::styled("Ctrl+s", Style::default().fg(Color::Magenta)),
                Span::raw(" show pwd  "),
                Span::styled("Esc", Style::default().fg(Color::Magenta)),
                Span::raw(" done"),
            ])
        } else {
            Line::from(vec![
                Span::styled("i", Style::default().fg(Color::Magenta)),
                Span::raw(" edit  "),
                Span::styled("2", Style::default().fg(Color::Magenta)),
                Span::raw(" continue as guest"),
            ])
        };
        buf.set_line(inner.x + 1, rows_end, &status, inner.width.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const DELAY: Duration = Duration::from_millis(1000);

    fn type_into(form: &mut LoginForm, s: &str, now: Instant) {
        for c in s.chars() {
            form.active_field_mut().insert_char(c, now);
        }
    }

    #[test]
    fn test_empty_email_flags_only_email() {
        let now = Instant::now();
        let mut form = LoginForm::new(DELAY);
        form.next_field();
        type_into(&mut form, "whiskers", now);

        assert!(form.submit("tok").is_none());
        assert!(form.username().has_error());
        assert!(!form.password().has_error());
        assert!(!form.submitting);
    }

    #[test]
    fn test_both_empty_flags_both() {
        let mut form = LoginForm::new(DELAY);
        assert!(form.submit("tok").is_none());
        assert!(form.username().has_error());
        assert!(form.password().has_error());
    }

    #[test]
    fn test_complete_form_clears_errors_and_proceeds() {
        let now = Instant::now();
        let mut form = LoginForm::new(DELAY);
        assert!(form.submit("tok").is_none());

        type_into(&mut form, "mia@example.com", now);
        form.next_field();
        type_into(&mut form, "whiskers", now);

        let submission = form.submit("tok").unwrap();
        assert!(!form.username().has_error());
        assert!(!form.password().has_error());
        assert!(form.submitting);
        assert_eq!(submission.username, "mia@example.com");
        assert_eq!(submission.password.expose_secret(), "whiskers");
        assert_eq!(submission.csrf_token, "tok");
    }

    #[test]
    fn test_focus_clears_field_error() {
        let mut form = LoginForm::new(DELAY);
        form.submit("tok");
        assert!(form.password().has_error());

        form.next_field();
        assert!(!form.password().has_error());
        // Email still flagged until it regains focus
        assert!(form.username().has_error());

        form.prev_field();
        assert!(!form.username().has_error());
    }

    #[test]
    fn test_password_masks_after_quiet_period() {
        let now = Instant::now();
        let mut form = LoginForm::new(DELAY);
        type_into(&mut form, "mia", now);
        form.next_field();
        type_into(&mut form, "abc", now);

        assert_eq!(form.password().display(), "abc");
        assert!(form.tick(now + DELAY));
        assert_eq!(form.password().display(), "***");
        assert_eq!(form.username().display(), "mia");

        form.toggle_password_visibility();
        assert_eq!(form.password().display(), "abc");
    }

    #[test]
    fn test_failed_login_clears_password_only() {
        let now = Instant::now();
        let mut form = LoginForm::new(DELAY);
        type_into(&mut form, "mia", now);
        form.next_field();
        type_into(&mut form, "nope", now);
        form.submit("tok").unwrap();

        form.fail(now);
        assert!(!form.submitting);
        assert_eq!(form.username().value(), "mia");
        assert_eq!(form.password().value(), "");
        assert_eq!(form.active_index(), 1);
    }

    #[test]
    fn test_reset_keeps_mask_delay() {
        let now = Instant::now();
        let mut form = LoginForm::new(Duration::from_millis(250));
        form.next_field();
        type_into(&mut form, "x", now);
        form.reset();

        assert_eq!(form.password().value(), "");
        assert_eq!(form.active_index(), 0);
        form.next_field();
        form.active_field_mut().insert_char('y', now);
        assert_eq!(form.password().next_deadline(), Some(now + Duration::from_millis(250)));
    }
}
