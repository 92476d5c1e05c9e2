//! Booking handoff to the external scheduling page.

use axum::{extract::State, Json};
use site_core::BookingRequest;
use tracing::info;

use crate::extractors::FormJson;
use crate::response::{ApiError, BookingResponse};
use crate::state::AppState;

/// POST /api/create-booking - Return a prefilled scheduling link.
///
/// Nothing is booked here; the client is redirected to the provider.
pub async fn create_booking_handler(
    State(state): State<AppState>,
    FormJson(request): FormJson<BookingRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    request.check()?;

    let url = state.scheduling.booking_url(&request)?;

    info!(date = ?request.date, "Created booking redirect");

    Ok(Json(BookingResponse {
        success: true,
        redirect_url: url.to_string(),
    }))
}
