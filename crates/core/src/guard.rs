//! Form-level bot checks: honeypot fields and fill timing.
//!
//! A form is rendered with one invisible honeypot input whose name rotates
//! between [`HoneypotField`] values, and reports how long it was open before
//! submit. A filled honeypot or a too-fast submit rejects the submission
//! without telling the client why.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::limits::MIN_FORM_FILL_MS;

/// Names used for the invisible honeypot input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoneypotField {
    Website,
    Url,
    EmailConfirm,
    PhoneConfirm,
}

impl HoneypotField {
    pub const ALL: [HoneypotField; 4] = [
        Self::Website,
        Self::Url,
        Self::EmailConfirm,
        Self::PhoneConfirm,
    ];

    /// The `name` attribute of the rendered input.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Url => "url",
            Self::EmailConfirm => "email_confirm",
            Self::PhoneConfirm => "phone_confirm",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Picks a field name for a new form render.
    pub fn random() -> Self {
        *Self::ALL
            .choose(&mut rand::thread_rng())
            .unwrap_or(&Self::Website)
    }
}

/// Tracks how long a form has been open.
#[derive(Debug, Clone, Copy)]
pub struct FormTimer {
    started_at_ms: i64,
    threshold_ms: u64,
}

impl FormTimer {
    /// Starts a timer at `started_at_ms` with the default threshold.
    pub fn start_at(started_at_ms: i64) -> Self {
        Self {
            started_at_ms,
            threshold_ms: MIN_FORM_FILL_MS,
        }
    }

    pub fn with_threshold(mut self, threshold_ms: u64) -> Self {
        self.threshold_ms = threshold_ms;
        self
    }

    pub fn elapsed_ms_at(&self, now_ms: i64) -> u64 {
        now_ms.saturating_sub(self.started_at_ms).max(0) as u64
    }

    /// True if a submit at `now_ms` comes before the threshold.
    pub fn is_suspicious_at(&self, now_ms: i64) -> bool {
        self.elapsed_ms_at(now_ms) < self.threshold_ms
    }
}

/// Bot-check fields carried alongside every form submission.
///
/// Flattened into the payload structs, so the honeypot names appear as
/// top-level JSON keys exactly as rendered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionGuard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_confirm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_confirm: Option<String>,
    /// Milliseconds between form render and submit, as measured by the form.
    #[serde(
        rename = "formElapsedMs",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub form_elapsed_ms: Option<u64>,
}

/// Outcome of the form-level bot checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardVerdict {
    Accept,
    /// A honeypot input carried a value.
    Honeypot(HoneypotField),
    /// Submitted before the minimum fill time.
    TooFast { elapsed_ms: u64 },
}

impl GuardVerdict {
    pub fn is_rejected(&self) -> bool {
        !matches!(self, Self::Accept)
    }
}

impl SubmissionGuard {
    fn field_value(&self, field: HoneypotField) -> Option<&str> {
        match field {
            HoneypotField::Website => self.website.as_deref(),
            HoneypotField::Url => self.url.as_deref(),
            HoneypotField::EmailConfirm => self.email_confirm.as_deref(),
            HoneypotField::PhoneConfirm => self.phone_confirm.as_deref(),
        }
    }

    /// The first honeypot field holding a non-empty value.
    pub fn filled_honeypot(&self) -> Option<HoneypotField> {
        HoneypotField::ALL
            .into_iter()
            .find(|f| self.field_value(*f).is_some_and(|v| !v.is_empty()))
    }

    /// Applies the composite policy at `now_ms`.
    ///
    /// A filled honeypot rejects regardless of timing. A submission that
    /// does not report its fill time is only judged by the honeypot.
    pub fn verdict_at(&self, now_ms: i64, threshold_ms: u64) -> GuardVerdict {
        if let Some(field) = self.filled_honeypot() {
            return GuardVerdict::Honeypot(field);
        }

        if let Some(elapsed) = self.form_elapsed_ms {
            let timer = FormTimer::start_at(now_ms.saturating_sub(elapsed as i64))
                .with_threshold(threshold_ms);
            if timer.is_suspicious_at(now_ms) {
                return GuardVerdict::TooFast {
                    elapsed_ms: timer.elapsed_ms_at(now_ms),
                };
            }
        }

        GuardVerdict::Accept
    }

    pub fn verdict(&self) -> GuardVerdict {
        self.verdict_at(chrono::Utc::now().timestamp_millis(), MIN_FORM_FILL_MS)
    }
}
