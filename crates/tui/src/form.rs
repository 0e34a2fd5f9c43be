use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use leaguedesk_core::{
    models::{LeagueDraft, LeagueStatus},
    validation::{
        FieldErrors, ForgotPasswordForm, LeagueForm, LoginForm, OtpForm, ResetPasswordForm,
        SignupForm,
    },
};

const MAX_INPUT_LEN: usize = 64;
const PASSWORD_LEN: usize = 8;
const OTP_LEN: usize = 6;

/// Single-line text input with a byte cursor. Accepts ASCII only.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    cursor: usize,
    max_len: usize,
    masked: bool,
}

impl TextInput {
    fn new(max_len: usize, masked: bool) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            max_len,
            masked,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set(&mut self, value: &str) {
        self.value = value
            .chars()
            .filter(|ch| ch.is_ascii() && !ch.is_ascii_control())
            .take(self.max_len)
            .collect();
        self.cursor = self.value.len();
    }

    /// Text to render; masked inputs show one bullet per character.
    pub fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.len())
        } else {
            self.value.clone()
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.value.len() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len) as usize;
    }

    fn insert(&mut self, ch: char) {
        if self.value.len() >= self.max_len {
            return;
        }
        if ch.is_ascii() && !ch.is_ascii_control() {
            self.value.insert(self.cursor, ch);
            self.cursor += 1;
        }
    }

    fn backspace(&mut self) {
        if self.cursor > 0 && self.cursor <= self.value.len() {
            self.cursor -= 1;
            self.value.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }
}

#[derive(Debug, Clone)]
pub enum FieldValue {
    Text(TextInput),
    Status(LeagueStatus),
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub value: FieldValue,
}

impl FormField {
    fn text(key: &'static str, label: &'static str) -> Self {
        Self::input(key, label, TextInput::new(MAX_INPUT_LEN, false))
    }

    fn password(key: &'static str, label: &'static str, max_len: usize) -> Self {
        Self::input(key, label, TextInput::new(max_len, true))
    }

    fn input(key: &'static str, label: &'static str, input: TextInput) -> Self {
        Self {
            key,
            label,
            value: FieldValue::Text(input),
        }
    }

    fn status(status: LeagueStatus) -> Self {
        Self {
            key: "status",
            label: "Status",
            value: FieldValue::Status(status),
        }
    }

    /// Rendered value.
    pub fn display(&self) -> String {
        match &self.value {
            FieldValue::Text(input) => input.display(),
            FieldValue::Status(status) => format!("◀ {status} ▶"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Submit,
    Cancel,
    Edited,
    Ignored,
}

/// Fields, focus and the last validation errors of one on-screen form.
#[derive(Debug, Clone)]
pub struct FormState {
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub errors: FieldErrors,
}

impl FormState {
    fn new(fields: Vec<FormField>) -> Self {
        Self {
            fields,
            focus: 0,
            errors: FieldErrors::new(),
        }
    }

    pub fn login() -> Self {
        Self::new(vec![
            FormField::text("email", "Email"),
            FormField::password("password", "Password", PASSWORD_LEN),
        ])
    }

    pub fn signup() -> Self {
        Self::new(vec![
            FormField::text("first_name", "First Name"),
            FormField::text("last_name", "Last Name"),
            FormField::text("email", "Email"),
            FormField::password("password", "Password", MAX_INPUT_LEN),
            FormField::password("confirm_password", "Confirm Password", MAX_INPUT_LEN),
        ])
    }

    pub fn forgot_password() -> Self {
        Self::new(vec![FormField::text("email", "Email")])
    }

    pub fn otp() -> Self {
        Self::new(vec![FormField::input(
            "otp",
            "Code",
            TextInput::new(OTP_LEN, false),
        )])
    }

    pub fn reset_password() -> Self {
        Self::new(vec![
            FormField::password("password", "New Password", PASSWORD_LEN),
            FormField::password("confirm_password", "Confirm Password", PASSWORD_LEN),
        ])
    }

    /// League editor, prefilled when editing.
    pub fn league(draft: Option<&LeagueDraft>) -> Self {
        let prefill = draft.map(LeagueForm::from_draft).unwrap_or_default();
        let mut form = Self::new(vec![
            FormField::text("id", "League ID"),
            FormField::text("name", "League Name"),
            FormField::text("country", "Country"),
            FormField::text("season", "Season"),
            FormField::text("competitions_count", "Competitions"),
            FormField::status(prefill.status),
            FormField::text("description", "Description"),
        ]);
        form.set("id", &prefill.id);
        form.set("name", &prefill.name);
        form.set("country", &prefill.country);
        form.set("season", &prefill.season);
        form.set(
            "competitions_count",
            if prefill.competitions_count.is_empty() {
                "0"
            } else {
                &prefill.competitions_count
            },
        );
        form.set("description", &prefill.description);
        form
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .and_then(|field| match &field.value {
                FieldValue::Text(input) => Some(input.value()),
                FieldValue::Status(_) => None,
            })
            .unwrap_or_default()
    }

    pub fn set(&mut self, key: &str, value: &str) {
        if let Some(FormField {
            value: FieldValue::Text(input),
            ..
        }) = self.fields.iter_mut().find(|field| field.key == key)
        {
            input.set(value);
        }
    }

    fn status(&self) -> LeagueStatus {
        self.fields
            .iter()
            .find_map(|field| match field.value {
                FieldValue::Status(status) => Some(status),
                FieldValue::Text(_) => None,
            })
            .unwrap_or_default()
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    fn focus_by(&mut self, delta: isize) {
        let len = self.fields.len() as isize;
        if len == 0 {
            return;
        }
        self.focus = (self.focus as isize + delta).rem_euclid(len) as usize;
    }

    /// Apply a key to the focused field. Enter on the last field submits.
    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Tab | KeyCode::Down => {
                self.focus_by(1);
                return FormAction::Ignored;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_by(-1);
                return FormAction::Ignored;
            }
            KeyCode::Enter => {
                if self.focus + 1 >= self.fields.len() {
                    return FormAction::Submit;
                }
                self.focus_by(1);
                return FormAction::Ignored;
            }
            _ => {}
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('s') = key.code {
                return FormAction::Submit;
            }
            return FormAction::Ignored;
        }

        let Some(field) = self.fields.get_mut(self.focus) else {
            return FormAction::Ignored;
        };
        let edited = match &mut field.value {
            FieldValue::Text(input) => match key.code {
                KeyCode::Left => {
                    input.move_cursor(-1);
                    false
                }
                KeyCode::Right => {
                    input.move_cursor(1);
                    false
                }
                KeyCode::Home => {
                    input.cursor = 0;
                    false
                }
                KeyCode::End => {
                    input.cursor = input.value.len();
                    false
                }
                KeyCode::Backspace => {
                    input.backspace();
                    true
                }
                KeyCode::Delete => {
                    input.delete();
                    true
                }
                KeyCode::Char(ch) => {
                    input.insert(ch);
                    true
                }
                _ => false,
            },
            FieldValue::Status(status) => match key.code {
                KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                    *status = status.next();
                    true
                }
                _ => false,
            },
        };
        if edited {
            self.errors.remove(field.key);
            FormAction::Edited
        } else {
            FormAction::Ignored
        }
    }

    pub fn to_login(&self) -> LoginForm {
        LoginForm {
            email: self.value("email").trim().to_string(),
            password: self.value("password").to_string(),
        }
    }

    pub fn to_signup(&self) -> SignupForm {
        SignupForm {
            first_name: self.value("first_name").trim().to_string(),
            last_name: self.value("last_name").trim().to_string(),
            email: self.value("email").trim().to_string(),
            password: self.value("password").to_string(),
            confirm_password: self.value("confirm_password").to_string(),
        }
    }

    pub fn to_forgot_password(&self) -> ForgotPasswordForm {
        ForgotPasswordForm {
            email: self.value("email").trim().to_string(),
        }
    }

    pub fn to_otp(&self) -> OtpForm {
        OtpForm {
            otp: self.value("otp").trim().to_string(),
        }
    }

    pub fn to_reset_password(&self) -> ResetPasswordForm {
        ResetPasswordForm {
            password: self.value("password").to_string(),
            confirm_password: self.value("confirm_password").to_string(),
        }
    }

    pub fn to_league(&self) -> LeagueForm {
        LeagueForm {
            id: self.value("id").to_string(),
            name: self.value("name").trim().to_string(),
            country: self.value("country").trim().to_string(),
            season: self.value("season").trim().to_string(),
            competitions_count: self.value("competitions_count").to_string(),
            status: self.status(),
            description: self.value("description").to_string(),
        }
    }

    /// Keep `errors` and move focus to the first field that has one.
    pub fn reject(&mut self, errors: FieldErrors) {
        if let Some(index) = self
            .fields
            .iter()
            .position(|field| errors.contains_key(field.key))
        {
            self.focus = index;
        }
        self.errors = errors;
    }
}
