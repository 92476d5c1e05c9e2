//! Admission thresholds and field limits.
//!
//! The `#[validate]` derive needs literal values, so the field length limits
//! below are repeated on the payload structs in `forms.rs`. Keep both in sync.

// === Rate Limits ===

/// Requests per window allowed on `/api/*` by the admission middleware.
pub const EDGE_MAX_REQUESTS: u32 = 20;

/// Submissions per window allowed on each form endpoint.
pub const FORM_MAX_REQUESTS: u32 = 5;

/// Rate limit window (one minute).
pub const RATE_WINDOW_MS: u64 = 60_000;

/// `Retry-After` value sent with 429 responses, in seconds.
pub const RETRY_AFTER_SECS: u64 = 60;

/// Identifier used when the client address cannot be determined.
///
/// All such clients share one bucket.
pub const UNKNOWN_CLIENT: &str = "unknown";

// === Bot Heuristics ===

/// Forms submitted faster than this after render are treated as automated.
pub const MIN_FORM_FILL_MS: u64 = 3_000;

// === Delivery ===

/// Soft execution budget for a form request that sends mail (9 seconds).
pub const EMAIL_TIME_BUDGET_MS: u64 = 9_000;

/// Time that must remain in the budget to start the confirmation email.
pub const CONFIRMATION_MIN_REMAINING_MS: u64 = 3_000;

// === Field Limits (chars) ===

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_PHONE_LEN: usize = 40;
pub const MAX_SUBJECT_LEN: usize = 300;
pub const MAX_MESSAGE_LEN: usize = 5_000;
pub const MAX_SERVICE_LEN: usize = 200;

/// Transcripts are capped at 100k characters.
pub const MAX_TRANSCRIPT_LEN: usize = 100_000;
