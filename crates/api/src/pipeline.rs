//! Shared steps of the form endpoints: screening and email delivery.

use integrations::{EmailMessage, SendReceipt};
use site_core::{limits::RETRY_AFTER_SECS, Submission};
use std::time::Instant;
use telemetry::metrics;
use tracing::{info, warn};

use crate::response::ApiError;
use crate::state::AppState;

/// Result of screening a submission.
#[derive(Debug, PartialEq, Eq)]
pub enum Screening {
    /// Valid and not flagged; go ahead.
    Proceed,
    /// Caught by the honeypot or timing check. Answer as if accepted and
    /// do nothing.
    Trapped,
}

/// Runs the per-endpoint checks in order: form rate limit, bot guard,
/// field validation.
pub fn screen(
    state: &AppState,
    form: &'static str,
    client_ip: &str,
    payload: &impl Submission,
) -> Result<Screening, ApiError> {
    metrics().submissions_received.inc();

    if state.form_limiter.is_limited(client_ip) {
        metrics().rate_limited_requests.inc();
        warn!(form, client = %client_ip, "Form rate limit exceeded");
        return Err(ApiError::rate_limited(Some(RETRY_AFTER_SECS)));
    }

    let verdict = payload.guard().verdict();
    if verdict.is_rejected() {
        metrics().submissions_trapped.inc();
        warn!(form, client = %client_ip, verdict = ?verdict, "Dropped automated submission");
        return Ok(Screening::Trapped);
    }

    if let Err(e) = payload.check() {
        metrics().submissions_invalid.inc();
        info!(form, error = %e, "Invalid submission");
        return Err(e.into());
    }

    Ok(Screening::Proceed)
}

/// Sends an email the request cannot succeed without.
pub async fn send_required(
    state: &AppState,
    kind: &'static str,
    message: &EmailMessage,
    failure_message: &'static str,
) -> Result<SendReceipt, ApiError> {
    match state.mailer.send(message).await {
        Ok(receipt) => {
            metrics().emails_sent.inc();
            info!(kind, id = %receipt.id, provider = state.mailer.provider(), "Email sent");
            Ok(receipt)
        }
        Err(e) => {
            metrics().email_errors.inc();
            warn!(kind, error = %e, "Email delivery failed");
            Err(ApiError::internal(failure_message))
        }
    }
}

/// Outcome of a non-critical email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    Sent(SendReceipt),
    /// Not started because too little of the time budget was left.
    Skipped,
    Failed,
}

/// Sends an email whose failure does not fail the request.
///
/// `started` is when the request began; when the delivery budget is
/// enforced and mostly spent, the email is not attempted.
pub async fn send_follow_up(
    state: &AppState,
    kind: &'static str,
    message: &EmailMessage,
    started: Instant,
) -> FollowUp {
    let elapsed = started.elapsed();
    if !state.delivery_budget().allows_followup(elapsed) {
        metrics().confirmations_skipped.inc();
        warn!(
            kind,
            elapsed_ms = elapsed.as_millis() as u64,
            "Skipping email, time budget nearly spent"
        );
        return FollowUp::Skipped;
    }

    match state.mailer.send(message).await {
        Ok(receipt) => {
            metrics().emails_sent.inc();
            info!(kind, id = %receipt.id, "Email sent");
            FollowUp::Sent(receipt)
        }
        Err(e) => {
            metrics().email_errors.inc();
            warn!(kind, error = %e, "Follow-up email failed, request still succeeds");
            FollowUp::Failed
        }
    }
}
