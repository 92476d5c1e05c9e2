//! Contact form endpoints.

use axum::{extract::State, Json};
use integrations::{templates, EmailMessage};
use site_core::ContactSubmission;
use std::time::Instant;

use crate::extractors::{ClientIp, FormJson};
use crate::pipeline::{screen, send_follow_up, send_required, Screening};
use crate::response::{ApiError, SubmissionResponse};
use crate::state::AppState;

const CONTACT_SUCCESS: &str = "Thank you for your message. We'll get back to you soon!";
const SEND_EMAIL_SUCCESS: &str = "Email sent successfully";
const SEND_FAILURE: &str = "Failed to send message. Please try again later.";

fn notification(state: &AppState, payload: &ContactSubmission) -> EmailMessage {
    let contact = payload.sanitized();
    let mut message = EmailMessage::new(
        state.email.from.clone(),
        state.email.admin_recipients.clone(),
        "New contact form submission",
        templates::contact_notification(&contact),
    );
    if let Some(reply_to) = payload.reply_to() {
        message = message.with_reply_to(reply_to);
    }
    message
}

/// POST /api/contact - Notify the team about a contact form submission.
pub async fn contact_handler(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    FormJson(payload): FormJson<ContactSubmission>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    if screen(&state, "contact", &client_ip, &payload)? == Screening::Trapped {
        return Ok(Json(SubmissionResponse::ok(CONTACT_SUCCESS)));
    }

    send_required(&state, "contact_notification", &notification(&state, &payload), SEND_FAILURE)
        .await?;

    Ok(Json(SubmissionResponse::ok(CONTACT_SUCCESS)))
}

/// POST /api/send-email - Notify the team and confirm to the sender.
///
/// The confirmation is skipped when the notification used up most of the
/// delivery budget, and its failure is not reported to the client.
pub async fn send_email_handler(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    FormJson(payload): FormJson<ContactSubmission>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let started = Instant::now();

    if screen(&state, "send_email", &client_ip, &payload)? == Screening::Trapped {
        return Ok(Json(SubmissionResponse::ok(SEND_EMAIL_SUCCESS)));
    }

    send_required(&state, "contact_notification", &notification(&state, &payload), SEND_FAILURE)
        .await?;

    if let Some(to) = payload.reply_to() {
        let confirmation = EmailMessage::new(
            state.email.from.clone(),
            vec![to.to_string()],
            "We received your message",
            templates::contact_confirmation(&payload.sanitized()),
        );
        send_follow_up(&state, "contact_confirmation", &confirmation, started).await;
    }

    Ok(Json(SubmissionResponse::ok(SEND_EMAIL_SUCCESS)))
}
