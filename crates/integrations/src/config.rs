//! Provider configuration.

use serde::{Deserialize, Serialize};
use site_core::limits::{CONFIRMATION_MIN_REMAINING_MS, EMAIL_TIME_BUDGET_MS};
use std::time::Duration;

/// Transactional email configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Resend API key. Without one, mail is logged instead of sent.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Provider base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Sender shown on every outgoing message
    #[serde(default = "default_from")]
    pub from: String,
    /// Recipients of contact and signup notifications
    #[serde(default = "default_admin_recipients")]
    pub admin_recipients: Vec<String>,
    /// Request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Soft budget for one form request, in milliseconds
    #[serde(default = "default_time_budget_ms")]
    pub time_budget_ms: u64,
    /// Budget that must remain to start a confirmation email
    #[serde(default = "default_confirmation_min_remaining_ms")]
    pub confirmation_min_remaining_ms: u64,
}

fn default_api_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_from() -> String {
    "Agency Website <noreply@updates.example.com>".to_string()
}

fn default_admin_recipients() -> Vec<String> {
    vec!["hello@example.com".to_string()]
}

fn default_request_timeout_ms() -> u64 {
    8000
}

fn default_time_budget_ms() -> u64 {
    EMAIL_TIME_BUDGET_MS
}

fn default_confirmation_min_remaining_ms() -> u64 {
    CONFIRMATION_MIN_REMAINING_MS
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            from: default_from(),
            admin_recipients: default_admin_recipients(),
            request_timeout_ms: default_request_timeout_ms(),
            time_budget_ms: default_time_budget_ms(),
            confirmation_min_remaining_ms: default_confirmation_min_remaining_ms(),
        }
    }
}

impl EmailConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Builds the delivery budget for one request.
    pub fn delivery_budget(&self, serverless: bool) -> DeliveryBudget {
        DeliveryBudget {
            enforced: serverless,
            total: Duration::from_millis(self.time_budget_ms),
            min_remaining: Duration::from_millis(self.confirmation_min_remaining_ms),
        }
    }
}

/// Soft execution deadline for requests that send more than one email.
///
/// Only enforced on serverless hosts, which kill the request at a hard
/// ceiling. A skipped email is never started.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryBudget {
    pub enforced: bool,
    pub total: Duration,
    pub min_remaining: Duration,
}

impl DeliveryBudget {
    /// Whether a non-critical email may still be started after `elapsed`.
    pub fn allows_followup(&self, elapsed: Duration) -> bool {
        if !self.enforced {
            return true;
        }
        self.total.saturating_sub(elapsed) >= self.min_remaining
    }
}

/// External scheduling page configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// Calendly personal access token. Used to look up the scheduling URL.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_scheduling_api_url")]
    pub api_url: String,
    /// Booking page used when no token is set or the lookup fails
    #[serde(default = "default_scheduling_url")]
    pub scheduling_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_scheduling_api_url() -> String {
    "https://api.calendly.com".to_string()
}

fn default_scheduling_url() -> String {
    "https://calendly.com/agency/consultation".to_string()
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_scheduling_api_url(),
            scheduling_url: default_scheduling_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}
