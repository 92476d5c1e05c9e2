//! Newsletter signup.

use axum::{extract::State, Json};
use integrations::{templates, EmailMessage};
use site_core::SubscribeSubmission;
use std::time::Instant;

use crate::extractors::{ClientIp, FormJson};
use crate::pipeline::{screen, send_follow_up, send_required, Screening};
use crate::response::{ApiError, SubmissionResponse};
use crate::state::AppState;

const SUBSCRIBE_SUCCESS: &str = "Successfully subscribed!";

/// POST /api/subscribe - Register interest and welcome the subscriber.
pub async fn subscribe_handler(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    FormJson(payload): FormJson<SubscribeSubmission>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let started = Instant::now();

    if screen(&state, "subscribe", &client_ip, &payload)? == Screening::Trapped {
        return Ok(Json(SubmissionResponse::ok(SUBSCRIBE_SUCCESS)));
    }

    let subscriber = payload.sanitized();

    let notification = EmailMessage::new(
        state.email.from.clone(),
        state.email.admin_recipients.clone(),
        "New newsletter subscriber",
        templates::subscribe_notification(&subscriber),
    );
    send_required(
        &state,
        "subscribe_notification",
        &notification,
        "Failed to subscribe. Please try again later.",
    )
    .await?;

    if let Some(to) = payload.address() {
        let welcome = EmailMessage::new(
            state.email.from.clone(),
            vec![to.to_string()],
            "You're subscribed",
            templates::subscribe_confirmation(&subscriber),
        );
        send_follow_up(&state, "subscribe_confirmation", &welcome, started).await;
    }

    Ok(Json(SubmissionResponse::ok(SUBSCRIBE_SUCCESS)))
}
