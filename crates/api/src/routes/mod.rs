//! API routes.

pub mod booking;
pub mod contact;
pub mod form_config;
pub mod health;
pub mod subscribe;
pub mod transcript;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::middleware::admission::admission;
use crate::response::panic_response;
use crate::state::AppState;

/// Creates the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/api/contact", post(contact::contact_handler))
        .route("/api/send-email", post(contact::send_email_handler))
        .route("/api/subscribe", post(subscribe::subscribe_handler))
        .route("/api/create-booking", post(booking::create_booking_handler))
        .route("/api/send-transcript", post(transcript::send_transcript_handler))
        .route("/api/form-config", get(form_config::form_config_handler))
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler));

    if let Some(dir) = &state.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(middleware::from_fn_with_state(state.clone(), admission))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
