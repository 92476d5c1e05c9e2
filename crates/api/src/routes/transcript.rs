//! Chat transcript delivery.

use axum::{extract::State, Json};
use integrations::{templates, EmailMessage};
use site_core::TranscriptRequest;

use crate::extractors::FormJson;
use crate::pipeline::send_required;
use crate::response::{ApiError, SubmissionResponse};
use crate::state::AppState;

/// POST /api/send-transcript - Email a chat transcript to the visitor.
pub async fn send_transcript_handler(
    State(state): State<AppState>,
    FormJson(request): FormJson<TranscriptRequest>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    request.check()?;

    let to = request.address().unwrap_or_default().to_string();
    let message = EmailMessage::new(
        state.email.from.clone(),
        vec![to],
        "Your conversation transcript",
        templates::transcript(&request.transcript),
    );

    send_required(
        &state,
        "transcript",
        &message,
        "Failed to send transcript. Please try again later.",
    )
    .await?;

    Ok(Json(SubmissionResponse::ok("Transcript sent successfully")))
}
