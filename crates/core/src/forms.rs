//! Form submission payloads.
//!
//! Every field arrives as untrusted text. Payloads are checked with
//! [`Submission::check`] and converted into escaped variants before any of
//! their text reaches an email body.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{Error, Result};
use crate::guard::SubmissionGuard;
use crate::limits::MAX_TRANSCRIPT_LEN;
use crate::sanitize::{sanitize, sanitize_multiline};

pub const MSG_REQUIRED: &str = "Please provide all required information";
pub const MSG_INVALID_EMAIL: &str = "Please provide a valid email address";
pub const MSG_TOO_LONG: &str = "One or more fields exceed the maximum length";

/// Email pattern shared by every endpoint that takes an address.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email pattern")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

/// Derive hook so padded addresses are judged the same way as in
/// [`is_valid_email`].
fn validate_email_field(email: &str) -> std::result::Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Maps derive validation errors to the single message shown to the user.
fn validation_message(errors: &ValidationErrors) -> &'static str {
    if errors.field_errors().contains_key("email") {
        MSG_INVALID_EMAIL
    } else {
        MSG_TOO_LONG
    }
}

/// A form payload that can be checked before use.
pub trait Submission {
    /// Checks required fields and formats.
    fn check(&self) -> Result<()>;

    /// Bot-check fields that came with the payload.
    fn guard(&self) -> &SubmissionGuard;
}

/// Contact form (`/api/contact` and `/api/send-email`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_email_field"), length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(length(max = 300))]
    pub subject: Option<String>,
    #[validate(length(max = 5000))]
    pub message: Option<String>,
    #[validate(length(max = 200))]
    pub service: Option<String>,
    #[serde(flatten)]
    pub guard: SubmissionGuard,
}

impl Submission for ContactSubmission {
    fn check(&self) -> Result<()> {
        let required = [&self.name, &self.email, &self.subject, &self.message];
        if required.into_iter().any(is_blank) {
            return Err(Error::validation(MSG_REQUIRED));
        }

        self.validate()
            .map_err(|e| Error::validation(validation_message(&e)))
    }

    fn guard(&self) -> &SubmissionGuard {
        &self.guard
    }
}

/// Contact submission with every field HTML-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    /// Escaped, with line breaks as `<br>`.
    pub message: String,
    pub service: Option<String>,
}

impl ContactSubmission {
    pub fn sanitized(&self) -> SanitizedContact {
        SanitizedContact {
            name: sanitize(self.name.as_deref().map(str::trim)),
            email: sanitize(self.email.as_deref().map(str::trim)),
            phone: non_blank(&self.phone).map(|p| sanitize(Some(p))),
            subject: sanitize(self.subject.as_deref().map(str::trim)),
            message: sanitize_multiline(self.message.as_deref()),
            service: non_blank(&self.service).map(|s| sanitize(Some(s))),
        }
    }

    /// Raw reply-to address, only after [`Submission::check`] passed.
    pub fn reply_to(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Newsletter signup (`/api/subscribe`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeSubmission {
    #[validate(custom(function = "validate_email_field"), length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub guard: SubmissionGuard,
}

impl Submission for SubscribeSubmission {
    fn check(&self) -> Result<()> {
        if is_blank(&self.email) {
            return Err(Error::validation("Email is required"));
        }

        self.validate()
            .map_err(|e| Error::validation(validation_message(&e)))
    }

    fn guard(&self) -> &SubmissionGuard {
        &self.guard
    }
}

/// Subscriber with escaped fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedSubscriber {
    pub email: String,
    pub phone: Option<String>,
}

impl SubscribeSubmission {
    pub fn sanitized(&self) -> SanitizedSubscriber {
        SanitizedSubscriber {
            email: sanitize(self.email.as_deref().map(str::trim)),
            phone: non_blank(&self.phone).map(|p| sanitize(Some(p))),
        }
    }

    pub fn address(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim)
    }
}

/// Booking request (`/api/create-booking`).
///
/// The booking itself is made on the external scheduling page; this only
/// carries what is needed to prefill it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Preferred time slot as displayed, e.g. `10:30 AM`.
    pub time: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl BookingRequest {
    pub fn check(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("date", &self.date),
            ("time", &self.time),
            ("name", &self.name),
            ("email", &self.email),
        ]
        .into_iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(Error::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        if !self.email.as_deref().is_some_and(is_valid_email) {
            return Err(Error::validation(MSG_INVALID_EMAIL));
        }

        self.parsed_date()?;
        Ok(())
    }

    pub fn parsed_date(&self) -> Result<NaiveDate> {
        let date = self.date.as_deref().unwrap_or_default().trim();
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| Error::validation("Invalid date, expected YYYY-MM-DD"))
    }
}

/// One line of a chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptMessage {
    pub role: String,
    pub content: String,
}

/// A chat transcript, either pre-formatted text or a list of messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Transcript {
    Text(String),
    Messages(Vec<TranscriptMessage>),
}

impl Default for Transcript {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl Transcript {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Messages(messages) => messages.iter().all(|m| m.content.trim().is_empty()),
        }
    }

    pub fn char_len(&self) -> usize {
        match self {
            Self::Text(text) => text.chars().count(),
            Self::Messages(messages) => messages.iter().map(|m| m.content.chars().count()).sum(),
        }
    }
}

/// Transcript delivery request (`/api/send-transcript`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRequest {
    pub email: Option<String>,
    #[serde(default)]
    pub transcript: Transcript,
}

impl TranscriptRequest {
    pub fn check(&self) -> Result<()> {
        let email = self.email.as_deref().unwrap_or_default();
        if !is_valid_email(email) {
            return Err(Error::validation(MSG_INVALID_EMAIL));
        }

        if self.transcript.is_empty() {
            return Err(Error::validation("Transcript is required"));
        }

        if self.transcript.char_len() > MAX_TRANSCRIPT_LEN {
            return Err(Error::validation("Transcript is too long"));
        }

        Ok(())
    }

    pub fn address(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim)
    }
}
