//! Request admission: bot filtering and rate limiting.

pub mod admission;
pub mod rate_limit;
