//! End-to-end tests for the form endpoints.

use axum::http::StatusCode;
use integration_tests::{
    fixtures,
    setup::{TestContext, TEST_ADMIN, TEST_SCHEDULING_URL},
};
use integrations::EmailConfig;

// ============================================================================
// Contact / send-email
// ============================================================================

#[tokio::test]
async fn test_contact_success_notifies_admin() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/contact")
        .add_header("x-forwarded-for", "203.0.113.1")
        .json(&fixtures::contact_payload())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body["message"].is_string());

    let sent = ctx.mailer.sent();
    assert_eq!(sent.len(), 1, "Contact sends the notification only");
    assert_eq!(sent[0].to, vec![TEST_ADMIN.to_string()]);
    assert_eq!(sent[0].reply_to.as_deref(), Some("ada@example.com"));
}

#[tokio::test]
async fn test_contact_missing_fields() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/contact")
        .json(&serde_json::json!({
            "name": "A",
            "email": "bad-email",
            "message": "hi"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&serde_json::json!({
        "success": false,
        "error": "Please provide all required information"
    }));
    assert_eq!(ctx.mailer.attempts(), 0);
}

#[tokio::test]
async fn test_contact_invalid_email() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut payload = fixtures::contact_payload();
    payload["email"] = "not-an-address".into();

    let response = server.post("/api/contact").json(&payload).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Please provide a valid email address");
}

#[tokio::test]
async fn test_padded_email_is_trimmed() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut payload = fixtures::contact_payload();
    payload["email"] = "  ada@example.com ".into();

    server
        .post("/api/send-email")
        .json(&payload)
        .await
        .assert_status_ok();

    server
        .post("/api/subscribe")
        .json(&fixtures::subscribe_payload(" reader@example.com "))
        .await
        .assert_status_ok();

    let sent = ctx.mailer.sent();
    assert_eq!(sent.len(), 4);
    assert_eq!(sent[0].reply_to.as_deref(), Some("ada@example.com"));
    assert_eq!(sent[1].to, vec!["ada@example.com".to_string()]);
    assert_eq!(sent[3].to, vec!["reader@example.com".to_string()]);
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/contact")
        .text("{not json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_contact_html_is_escaped() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut payload = fixtures::contact_payload();
    payload["message"] = "<script>alert('x')</script>".into();

    server
        .post("/api/contact")
        .json(&payload)
        .await
        .assert_status_ok();

    let html = &ctx.mailer.sent()[0].html;
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;alert(&#x27;x&#x27;)&lt;&#x2F;script&gt;"));
}

#[tokio::test]
async fn test_send_email_sends_notification_and_confirmation() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .post("/api/send-email")
        .json(&fixtures::contact_payload())
        .await
        .assert_status_ok();

    let sent = ctx.mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, vec![TEST_ADMIN.to_string()]);
    assert_eq!(sent[1].to, vec!["ada@example.com".to_string()]);
}

#[tokio::test]
async fn test_send_email_skips_confirmation_when_budget_spent() {
    let email = EmailConfig {
        time_budget_ms: 0,
        ..EmailConfig::default()
    };
    let ctx = TestContext::with_email(email, |state| state.with_serverless(true));
    let server = ctx.server();

    let response = server
        .post("/api/send-email")
        .json(&fixtures::contact_payload())
        .await;

    response.assert_status_ok();
    assert_eq!(ctx.mailer.attempts(), 1, "Confirmation must not be started");
}

#[tokio::test]
async fn test_budget_ignored_off_serverless() {
    let email = EmailConfig {
        time_budget_ms: 0,
        ..EmailConfig::default()
    };
    let ctx = TestContext::with_email(email, |state| state);
    let server = ctx.server();

    server
        .post("/api/send-email")
        .json(&fixtures::contact_payload())
        .await
        .assert_status_ok();

    assert_eq!(ctx.mailer.sent_count(), 2);
}

#[tokio::test]
async fn test_confirmation_failure_still_succeeds() {
    let ctx = TestContext::new();
    ctx.mailer.fail_after(1);
    let server = ctx.server();

    let response = server
        .post("/api/send-email")
        .json(&fixtures::contact_payload())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(ctx.mailer.attempts(), 2);
    assert_eq!(ctx.mailer.sent_count(), 1);
}

#[tokio::test]
async fn test_mailer_failure_returns_generic_error() {
    let ctx = TestContext::new();
    ctx.mailer.set_should_fail(true);
    let server = ctx.server();

    let response = server
        .post("/api/contact")
        .json(&fixtures::contact_payload())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    let error = body["error"].as_str().unwrap_or_default();
    assert!(!error.contains("mock"), "Provider details leaked: {}", error);
}

// ============================================================================
// Bot guard
// ============================================================================

#[tokio::test]
async fn test_honeypot_is_silently_dropped() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut payload = fixtures::contact_payload();
    payload["email_confirm"] = "ada@example.com".into();

    let response = server.post("/api/send-email").json(&payload).await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(ctx.mailer.attempts(), 0);
}

#[tokio::test]
async fn test_fast_submission_is_silently_dropped() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut payload = fixtures::contact_payload();
    payload["formElapsedMs"] = 900.into();

    server
        .post("/api/contact")
        .json(&payload)
        .await
        .assert_status_ok();

    assert_eq!(ctx.mailer.attempts(), 0);
}

#[tokio::test]
async fn test_empty_honeypot_is_accepted() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut payload = fixtures::contact_payload();
    payload["url"] = "".into();

    server
        .post("/api/contact")
        .json(&payload)
        .await
        .assert_status_ok();

    assert_eq!(ctx.mailer.sent_count(), 1);
}

// ============================================================================
// Subscribe and form rate limit
// ============================================================================

#[tokio::test]
async fn test_subscribe_sends_notification_and_welcome() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/subscribe")
        .json(&fixtures::subscribe_payload("reader@example.com"))
        .await;

    response.assert_status_ok();
    let sent = ctx.mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].to, vec!["reader@example.com".to_string()]);
}

#[tokio::test]
async fn test_subscribe_requires_email() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/subscribe")
        .json(&serde_json::json!({ "phone": "555" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Email is required");
}

#[tokio::test]
async fn test_sixth_subscribe_in_a_minute_is_limited() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for i in 0..5 {
        let response = server
            .post("/api/subscribe")
            .add_header("x-forwarded-for", "203.0.113.9")
            .json(&fixtures::subscribe_payload(&format!("r{}@example.com", i)))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK, "request {}", i + 1);
    }

    let response = server
        .post("/api/subscribe")
        .add_header("x-forwarded-for", "203.0.113.9")
        .json(&fixtures::subscribe_payload("r5@example.com"))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.header("retry-after"), "60");
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(ctx.mailer.sent_count(), 10);
}

#[tokio::test]
async fn test_form_limit_is_shared_across_form_endpoints() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for _ in 0..5 {
        server
            .post("/api/contact")
            .add_header("x-forwarded-for", "203.0.113.20")
            .json(&fixtures::contact_payload())
            .await
            .assert_status_ok();
    }

    server
        .post("/api/subscribe")
        .add_header("x-forwarded-for", "203.0.113.20")
        .json(&fixtures::subscribe_payload("late@example.com"))
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_forwarded_for_uses_first_entry() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for i in 0..5 {
        server
            .post("/api/subscribe")
            .add_header("x-forwarded-for", format!("203.0.113.30, 10.0.0.{}", i))
            .json(&fixtures::subscribe_payload("x@example.com"))
            .await
            .assert_status_ok();
    }

    server
        .post("/api/subscribe")
        .add_header("x-forwarded-for", "203.0.113.30")
        .json(&fixtures::subscribe_payload("x@example.com"))
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

// ============================================================================
// Booking and transcript
// ============================================================================

#[tokio::test]
async fn test_create_booking_returns_prefilled_url() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/create-booking")
        .json(&fixtures::booking_payload())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);

    let url = body["redirectUrl"].as_str().unwrap_or_default();
    assert!(url.starts_with(TEST_SCHEDULING_URL));
    assert!(url.contains("name=Ada+Lovelace"));
    assert!(url.contains("email=ada%40example.com"));
    assert!(url.contains("date=2026-11-03"));
    assert!(url.contains("month=2026-11"));
    assert_eq!(ctx.mailer.attempts(), 0);
}

#[tokio::test]
async fn test_create_booking_missing_fields() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/create-booking")
        .json(&serde_json::json!({ "date": "2026-11-03" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .starts_with("Missing required fields"));
}

#[tokio::test]
async fn test_send_transcript_escapes_content() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .post("/api/send-transcript")
        .json(&fixtures::transcript_payload())
        .await
        .assert_status_ok();

    let sent = ctx.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["ada@example.com".to_string()]);
    assert!(sent[0].html.contains("&lt;b&gt;Shopify&lt;&#x2F;b&gt;"));
    assert!(!sent[0].html.contains("<b>Shopify</b>"));
}

#[tokio::test]
async fn test_send_transcript_rejects_bad_email() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/send-transcript")
        .json(&serde_json::json!({ "email": "nope", "transcript": "hello" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Please provide a valid email address");
}
