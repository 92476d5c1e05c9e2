//! Admission middleware applied to every non-asset request.
//!
//! Order: bot user agents are refused with a bare 403, then `/api/*`
//! requests are counted against the edge limiter (429 with
//! `Retry-After`), then the request is forwarded unchanged.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use site_core::{classify_user_agent, limits::RETRY_AFTER_SECS, UserAgentClass};
use telemetry::metrics;
use tracing::{debug, warn};

use crate::extractors::client_identifier;
use crate::response::ApiError;
use crate::state::AppState;

/// Paths that skip admission entirely.
const BYPASS_PREFIXES: &[&str] = &["/static/", "/assets/", "/health/"];
const BYPASS_FILES: &[&str] = &["/favicon.ico", "/robots.txt", "/sitemap.xml", "/health"];

fn bypasses_admission(path: &str) -> bool {
    BYPASS_FILES.contains(&path) || BYPASS_PREFIXES.iter().any(|p| path.starts_with(p))
}

pub fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

pub async fn admission(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path();

    if bypasses_admission(path) {
        return next.run(request).await;
    }

    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    let class = classify_user_agent(user_agent);
    if class.is_rejected() {
        metrics().bot_rejections.inc();
        warn!(path = %path, user_agent = %user_agent, "Rejected bot user agent");
        return StatusCode::FORBIDDEN.into_response();
    }
    if class == UserAgentClass::AllowedCrawler {
        debug!(path = %path, user_agent = %user_agent, "Allowed search crawler");
    }

    if is_api_path(path) {
        let client_id = client_identifier(request.headers());
        if state.edge_limiter.is_limited(&client_id) {
            metrics().rate_limited_requests.inc();
            warn!(client = %client_id, path = %path, "Edge rate limit exceeded");
            return ApiError::rate_limited(Some(RETRY_AFTER_SECS)).into_response();
        }
    }

    metrics().requests_admitted.inc();
    next.run(request).await
}
