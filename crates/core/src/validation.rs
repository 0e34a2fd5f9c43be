//! Form schemas checked before anything reaches the store.

use std::{borrow::Cow, collections::BTreeMap};

use once_cell::sync::Lazy;
use regex::Regex;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::models::{LeagueDraft, LeagueStatus, SignupRequest};

/// First message per invalid field, keyed by field name.
pub type FieldErrors = BTreeMap<String, String>;

static OTP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").expect("invalid otp regex"));

const PASSWORDS_MUST_MATCH: &str = "Passwords must match";

/// A form that can be checked as a whole, including cross-field rules.
pub trait FormSchema: Validate {
    /// Rules the derive cannot express.
    fn cross_field(&self, _errors: &mut FieldErrors) {}

    /// Run every rule, returning per-field messages on failure.
    fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(errors) => field_errors(&errors),
        };
        self.cross_field(&mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Flatten `validator` output to one message per field.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, list)| {
            list.first().map(|error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                (field.to_string(), message)
            })
        })
        .collect()
}

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn email_address(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule("required", "Required"));
    }
    if !value.validate_email() {
        return Err(rule("email", "Invalid email"));
    }
    Ok(())
}

fn no_whitespace(value: &str) -> Result<(), ValidationError> {
    if value.chars().any(char::is_whitespace) {
        return Err(rule("no_spaces", "No spaces allowed"));
    }
    Ok(())
}

fn strong_password(value: &str) -> Result<(), ValidationError> {
    no_whitespace(value)?;
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(rule("uppercase", "At least 1 uppercase letter"));
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(rule("lowercase", "At least 1 lowercase letter"));
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Err(rule("digit", "At least 1 number"));
    }
    if value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(rule("special", "At least 1 special character"));
    }
    Ok(())
}

fn six_digit_code(value: &str) -> Result<(), ValidationError> {
    if !OTP_RE.is_match(value) {
        return Err(rule("otp", "Enter a valid 6-digit code"));
    }
    Ok(())
}

fn non_negative_count(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(rule("required", "Required"));
    }
    match trimmed.parse::<i64>() {
        Ok(count) if count < 0 => Err(rule("min", "Must be positive")),
        Ok(count) if u32::try_from(count).is_err() => Err(rule("max", "Too large")),
        Ok(_) => Ok(()),
        Err(_) => Err(rule("number", "Must be a number")),
    }
}

fn confirm_matches(errors: &mut FieldErrors, password: &str, confirm: &str) {
    if confirm.is_empty() {
        errors
            .entry("confirm_password".to_string())
            .or_insert_with(|| "Required".to_string());
    } else if password != confirm {
        errors
            .entry("confirm_password".to_string())
            .or_insert_with(|| PASSWORDS_MUST_MATCH.to_string());
    }
}

/// Sign-in form.
#[derive(Debug, Clone, Default, Validate)]
pub struct LoginForm {
    /// Account email.
    #[validate(custom(function = "email_address"))]
    pub email: String,
    /// Password; the console caps input at 8 characters.
    #[validate(
        length(equal = 8, message = "Minimum 8 characters"),
        custom(function = "no_whitespace")
    )]
    pub password: String,
}

impl FormSchema for LoginForm {}

/// Account creation form.
#[derive(Debug, Clone, Default, Validate)]
pub struct SignupForm {
    /// Given name.
    #[validate(length(min = 1, message = "First Name is required"))]
    pub first_name: String,
    /// Family name.
    #[validate(length(min = 1, message = "Last Name is required"))]
    pub last_name: String,
    /// Login email.
    #[validate(custom(function = "email_address"))]
    pub email: String,
    /// Chosen password.
    #[validate(length(min = 6, message = "Minimum 6 characters"))]
    pub password: String,
    /// Must equal `password`.
    pub confirm_password: String,
}

impl FormSchema for SignupForm {
    fn cross_field(&self, errors: &mut FieldErrors) {
        confirm_matches(errors, &self.password, &self.confirm_password);
    }
}

impl SignupForm {
    /// Payload for the signup endpoint. The confirmation is not sent.
    pub fn to_request(&self) -> SignupRequest {
        SignupRequest {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

/// Password-reset request form.
#[derive(Debug, Clone, Default, Validate)]
pub struct ForgotPasswordForm {
    /// Account email.
    #[validate(custom(function = "email_address"))]
    pub email: String,
}

impl FormSchema for ForgotPasswordForm {}

/// One-time code form.
#[derive(Debug, Clone, Default, Validate)]
pub struct OtpForm {
    /// Six-digit code.
    #[validate(custom(function = "six_digit_code"))]
    pub otp: String,
}

impl FormSchema for OtpForm {}

/// New password form.
#[derive(Debug, Clone, Default, Validate)]
pub struct ResetPasswordForm {
    /// New password.
    #[validate(
        length(equal = 8, message = "Minimum 8 characters"),
        custom(function = "strong_password")
    )]
    pub password: String,
    /// Must equal `password`.
    pub confirm_password: String,
}

impl FormSchema for ResetPasswordForm {
    fn cross_field(&self, errors: &mut FieldErrors) {
        confirm_matches(errors, &self.password, &self.confirm_password);
    }
}

/// League create/edit form. Text fields hold raw input.
#[derive(Debug, Clone, Default, Validate)]
pub struct LeagueForm {
    /// Human-facing identifier, optional.
    pub id: String,
    /// League name.
    #[validate(length(min = 1, message = "League Name is required"))]
    pub name: String,
    /// Country.
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    /// Season label.
    #[validate(length(min = 1, message = "Season is required"))]
    pub season: String,
    /// Raw competition count.
    #[validate(custom(function = "non_negative_count"))]
    pub competitions_count: String,
    /// Publication state.
    pub status: LeagueStatus,
    /// Optional notes.
    pub description: String,
}

impl FormSchema for LeagueForm {}

impl LeagueForm {
    /// Prefill from an existing draft.
    pub fn from_draft(draft: &LeagueDraft) -> Self {
        Self {
            id: draft.id.clone(),
            name: draft.name.clone(),
            country: draft.country.clone(),
            season: draft.season.clone(),
            competitions_count: draft.competitions_count.to_string(),
            status: draft.status,
            description: draft.description.clone().unwrap_or_default(),
        }
    }

    /// Validate and convert to a request body.
    pub fn to_draft(&self) -> Result<LeagueDraft, FieldErrors> {
        self.check()?;
        let competitions_count = self.competitions_count.trim().parse().map_err(|_| {
            FieldErrors::from([(
                "competitions_count".to_string(),
                "Must be a number".to_string(),
            )])
        })?;
        let description = self.description.trim();
        Ok(LeagueDraft {
            id: self.id.trim().to_string(),
            name: self.name.trim().to_string(),
            country: self.country.trim().to_string(),
            season: self.season.trim().to_string(),
            competitions_count,
            status: self.status,
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }
}
