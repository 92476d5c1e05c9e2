//! Render-time parameters for forms.

use axum::Json;
use site_core::{limits::MIN_FORM_FILL_MS, HoneypotField};

use crate::response::FormConfigResponse;

/// GET /api/form-config - Honeypot name and minimum fill time for a new form.
pub async fn form_config_handler() -> Json<FormConfigResponse> {
    Json(FormConfigResponse {
        honeypot_field: HoneypotField::random().name().to_string(),
        min_fill_ms: MIN_FORM_FILL_MS,
    })
}
