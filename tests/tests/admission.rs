//! Tests for the admission middleware: bot filtering and edge rate limiting.

use axum::http::StatusCode;
use integration_tests::{fixtures, setup::TestContext};

/// Bot user agents are refused with a bare 403
#[tokio::test]
async fn test_bot_user_agent_rejected_without_body() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/contact")
        .add_header("user-agent", fixtures::HEADLESS_UA)
        .json(&fixtures::contact_payload())
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert!(response.text().is_empty(), "403 should have no body");
    assert_eq!(ctx.mailer.attempts(), 0, "Handler must not run");
}

/// Bots are refused on non-API paths too
#[tokio::test]
async fn test_bot_rejected_on_page_paths() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .get("/blog/launch")
        .add_header("user-agent", "python-requests/2.31.0")
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

/// Googlebot matches the keyword list but is allow-listed
#[tokio::test]
async fn test_googlebot_is_forwarded() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .get("/api/form-config")
        .add_header("user-agent", fixtures::GOOGLEBOT_UA)
        .await;

    response.assert_status_ok();
}

/// The 21st API request in a minute from one client gets a 429
#[tokio::test]
async fn test_edge_rate_limit() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for i in 0..20 {
        let response = server
            .get("/api/form-config")
            .add_header("x-forwarded-for", "198.51.100.4")
            .add_header("user-agent", fixtures::BROWSER_UA)
            .await;
        assert_eq!(
            response.status_code(),
            StatusCode::OK,
            "request {} should be admitted",
            i + 1
        );
    }

    let response = server
        .get("/api/form-config")
        .add_header("x-forwarded-for", "198.51.100.4")
        .add_header("user-agent", fixtures::BROWSER_UA)
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.header("retry-after"), "60");

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    // A different client is unaffected
    let response = server
        .get("/api/form-config")
        .add_header("x-forwarded-for", "198.51.100.5")
        .await;
    response.assert_status_ok();
}

/// Page paths are not counted against the API limit
#[tokio::test]
async fn test_non_api_paths_not_rate_limited() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for _ in 0..25 {
        let response = server
            .get("/about")
            .add_header("x-forwarded-for", "198.51.100.9")
            .await;
        assert_ne!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }
}

/// Requests without a forwarded address share the "unknown" bucket
#[tokio::test]
async fn test_unidentified_clients_share_bucket() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for _ in 0..20 {
        server.get("/api/form-config").await.assert_status_ok();
    }

    server
        .get("/api/form-config")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert!(ctx.state.edge_limiter.tracked_clients() >= 1);
}

/// Health endpoints bypass admission
#[tokio::test]
async fn test_health_bypasses_bot_filter() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .get("/health/live")
        .add_header("user-agent", "curl/8.4.0")
        .await;

    response.assert_status_ok();
}

/// Form config returns a known honeypot name
#[tokio::test]
async fn test_form_config() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/api/form-config").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let field = body["honeypotField"].as_str().unwrap_or_default();
    assert!(site_core::HoneypotField::from_name(field).is_some());
    assert_eq!(body["minFillMs"], 3000);
}
