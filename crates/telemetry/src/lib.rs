//! Telemetry for the agency site.
//!
//! Structured logs go through `tracing`. Counters and component health are
//! kept in process and exposed on the health endpoint.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
