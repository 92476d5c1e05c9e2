//! Unified error type for the site.
//!
//! Every variant maps to an HTTP status and to the message a client is
//! allowed to see. Downstream and internal details stay in the logs.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Generic message returned for failures the client cannot act on.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again later.";

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed input. The message is shown to the client.
    #[error("validation error: {0}")]
    Validation(String),

    /// Too many requests from one client identifier.
    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<u64>,
    },

    /// A third-party service (mail provider, scheduler) failed.
    #[error("{service} error: {message}")]
    Downstream {
        service: &'static str,
        message: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn rate_limited(msg: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self::RateLimited {
            message: msg.into(),
            retry_after,
        }
    }

    pub fn downstream(service: &'static str, msg: impl Into<String>) -> Self {
        Self::Downstream {
            service,
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::RateLimited { .. } => 429,
            Self::Downstream { .. } => 500,
            Self::Config(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Message safe to return to the client.
    ///
    /// Validation and rate-limit messages are written for end users; all
    /// other variants collapse to [`GENERIC_FAILURE_MESSAGE`].
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::RateLimited { message, .. } => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.http_status() < 500
    }
}
