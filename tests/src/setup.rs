//! Common test setup functions.

use api::{router, AppState};
use axum::Router;
use axum_test::TestServer;
use integrations::{EmailConfig, Mailer, SchedulingClient};
use std::sync::Arc;

use crate::mocks::MockMailer;

pub const TEST_SCHEDULING_URL: &str = "https://calendly.com/agency-test/intro";
pub const TEST_ADMIN: &str = "team@agency.test";

/// Test context with the real router and a mock mailer.
pub struct TestContext {
    pub mailer: Arc<MockMailer>,
    pub state: AppState,
    pub router: Router,
}

impl TestContext {
    /// Default limits, not serverless.
    pub fn new() -> Self {
        Self::with_state(|state| state)
    }

    /// Build a context after adjusting the state.
    pub fn with_state(configure: impl FnOnce(AppState) -> AppState) -> Self {
        Self::with_email(EmailConfig::default(), configure)
    }

    pub fn with_email(
        email: EmailConfig,
        configure: impl FnOnce(AppState) -> AppState,
    ) -> Self {
        let mailer = Arc::new(MockMailer::new());
        let email = EmailConfig {
            admin_recipients: vec![TEST_ADMIN.to_string()],
            ..email
        };
        let scheduling =
            SchedulingClient::new(TEST_SCHEDULING_URL).expect("valid scheduling URL");

        let state = configure(AppState::new(
            mailer.clone() as Arc<dyn Mailer>,
            scheduling,
            email,
        ));
        let router = router(state.clone());

        Self {
            mailer,
            state,
            router,
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).expect("Failed to create test server")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
