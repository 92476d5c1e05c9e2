//! Transactional email delivery.
//!
//! One [`Mailer`] is built at startup from [`EmailConfig`] and shared by
//! every handler. Without an API key the site still runs and logs messages
//! instead of sending them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use site_core::{Error, Result};
use std::sync::Arc;
use std::time::Instant;
use telemetry::metrics;
use tracing::{debug, info, warn};

use crate::config::EmailConfig;

/// An outgoing email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

impl EmailMessage {
    pub fn new(
        from: impl Into<String>,
        to: Vec<String>,
        subject: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to,
            subject: subject.into(),
            html: html.into(),
            reply_to: None,
        }
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }
}

/// Provider acknowledgement for a sent email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub id: String,
}

/// Sends email through some provider.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt>;

    /// Provider name for logs and health reports.
    fn provider(&self) -> &'static str;

    /// Whether messages actually leave the process.
    fn delivers(&self) -> bool {
        true
    }
}

/// Builds the process-wide mailer from configuration.
pub fn mailer_from_config(config: &EmailConfig) -> Result<Arc<dyn Mailer>> {
    if config.has_api_key() {
        info!(api_url = %config.api_url, "Using Resend mailer");
        Ok(Arc::new(ResendMailer::new(config)?))
    } else {
        warn!("RESEND_API_KEY not set, outgoing email will only be logged");
        Ok(Arc::new(LogMailer))
    }
}

/// Resend HTTP API client.
pub struct ResendMailer {
    api_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct ResendResponse {
    id: String,
}

impl ResendMailer {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::config("Resend API key is required"))?;

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key,
            http_client,
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt> {
        let url = format!("{}/emails", self.api_url);
        let start = Instant::now();

        debug!(to = ?message.to, subject = %message.subject, "Sending email");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Idempotency-Key", uuid::Uuid::new_v4().to_string())
            .json(message)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Resend request failed");
                Error::downstream("resend", format!("request failed: {}", e))
            })?;

        metrics()
            .email_latency_ms
            .observe(start.elapsed().as_millis() as u64);

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Resend returned error");
            return Err(Error::downstream(
                "resend",
                format!("returned {}: {}", status, body),
            ));
        }

        let parsed: ResendResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse Resend response");
            Error::downstream("resend", format!("invalid response: {}", e))
        })?;

        Ok(SendReceipt { id: parsed.id })
    }

    fn provider(&self) -> &'static str {
        "resend"
    }
}

/// Mailer used when no provider is configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt> {
        info!(
            to = ?message.to,
            subject = %message.subject,
            bytes = message.html.len(),
            "Email not sent (no provider configured)"
        );
        Ok(SendReceipt {
            id: format!("log-{}", uuid::Uuid::new_v4()),
        })
    }

    fn provider(&self) -> &'static str {
        "log"
    }

    fn delivers(&self) -> bool {
        false
    }
}
