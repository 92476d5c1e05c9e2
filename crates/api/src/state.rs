//! Application state shared across handlers.

use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter, SharedRateLimiter};
use integrations::{DeliveryBudget, EmailConfig, Mailer, SchedulingClient};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// How often stale rate limit records are swept.
const RATE_LIMIT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide mail client
    pub mailer: Arc<dyn Mailer>,
    /// Booking link builder
    pub scheduling: SchedulingClient,
    /// Sender, recipients and delivery budget
    pub email: Arc<EmailConfig>,
    /// Limiter applied to every `/api/*` request
    pub edge_limiter: SharedRateLimiter,
    /// Limiter applied by form endpoints
    pub form_limiter: SharedRateLimiter,
    /// Running on a serverless host with a hard execution ceiling
    pub serverless: bool,
    /// Pre-built site served for non-API paths
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(mailer: Arc<dyn Mailer>, scheduling: SchedulingClient, email: EmailConfig) -> Self {
        Self {
            mailer,
            scheduling,
            email: Arc::new(email),
            edge_limiter: Arc::new(RateLimiter::new(RateLimitConfig::edge())),
            form_limiter: Arc::new(RateLimiter::new(RateLimitConfig::form())),
            serverless: false,
            static_dir: None,
        }
    }

    /// Replace both limiters.
    pub fn with_rate_limits(mut self, edge: RateLimitConfig, form: RateLimitConfig) -> Self {
        self.edge_limiter = Arc::new(RateLimiter::new(edge));
        self.form_limiter = Arc::new(RateLimiter::new(form));
        self
    }

    pub fn with_serverless(mut self, serverless: bool) -> Self {
        self.serverless = serverless;
        self
    }

    pub fn with_static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Budget for requests that send a follow-up email.
    pub fn delivery_budget(&self) -> DeliveryBudget {
        self.email.delivery_budget(self.serverless)
    }

    /// Start the rate limiter cleanup background task.
    /// Returns a handle that can be used to cancel the task.
    pub fn start_rate_limiter_cleanup(&self) -> tokio::task::JoinHandle<()> {
        let edge = self.edge_limiter.clone();
        let form = self.form_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(RATE_LIMIT_SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                edge.cleanup_stale();
                form.cleanup_stale();
            }
        })
    }
}
