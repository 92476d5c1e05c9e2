//! Fixed-window rate limiting keyed by client identifier.
//!
//! State lives behind [`RateLimitStore`]. The shipped [`MemoryStore`] is
//! process-local, so with several instances the effective limit is
//! `max_requests` times the instance count.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use site_core::limits::{EDGE_MAX_REQUESTS, FORM_MAX_REQUESTS, RATE_WINDOW_MS};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics;
use tracing::debug;

/// Calls between opportunistic sweeps.
const SWEEP_EVERY: u64 = 256;

/// Requests seen from one client in the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientRequestRecord {
    pub count: u32,
    pub window_start_ms: i64,
}

impl ClientRequestRecord {
    fn fresh(now_ms: i64) -> Self {
        Self {
            count: 1,
            window_start_ms: now_ms,
        }
    }

    fn is_expired(&self, now_ms: i64, window_ms: i64) -> bool {
        now_ms - self.window_start_ms > window_ms
    }
}

/// Storage for per-client records.
///
/// `update` must apply the read-modify-write atomically with respect to
/// other calls for the same key. The default is only correct for stores
/// with a single writer.
pub trait RateLimitStore: Send + Sync {
    fn get(&self, key: &str) -> Option<ClientRequestRecord>;

    fn set(&self, key: &str, record: ClientRequestRecord);

    /// Removes records whose window ended more than `window_ms` ago.
    /// Returns how many were removed.
    fn sweep(&self, now_ms: i64, window_ms: i64) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<ClientRequestRecord>) -> ClientRequestRecord,
    ) -> ClientRequestRecord {
        let next = f(self.get(key));
        self.set(key, next);
        next
    }
}

/// In-process store.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, ClientRequestRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for MemoryStore {
    fn get(&self, key: &str) -> Option<ClientRequestRecord> {
        self.records.lock().get(key).copied()
    }

    fn set(&self, key: &str, record: ClientRequestRecord) {
        self.records.lock().insert(key.to_string(), record);
    }

    fn sweep(&self, now_ms: i64, window_ms: i64) -> usize {
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now_ms, window_ms));
        before - records.len()
    }

    fn len(&self) -> usize {
        self.records.lock().len()
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<ClientRequestRecord>) -> ClientRequestRecord,
    ) -> ClientRequestRecord {
        let mut records = self.records.lock();
        let next = f(records.get(key).copied());
        records.insert(key.to_string(), next);
        next
    }
}

/// Limit applied by one [`RateLimiter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per window
    pub max_requests: u32,
    /// Window length in milliseconds
    pub window_ms: u64,
}

impl RateLimitConfig {
    /// Limit for every `/api/*` request at the admission layer.
    pub fn edge() -> Self {
        Self {
            max_requests: EDGE_MAX_REQUESTS,
            window_ms: RATE_WINDOW_MS,
        }
    }

    /// Limit for form submission endpoints.
    pub fn form() -> Self {
        Self {
            max_requests: FORM_MAX_REQUESTS,
            window_ms: RATE_WINDOW_MS,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::edge()
    }
}

/// Fixed-window limiter over a [`RateLimitStore`].
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    config: RateLimitConfig,
    calls: AtomicU64,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(config: RateLimitConfig, store: Arc<dyn RateLimitStore>) -> Self {
        Self {
            store,
            config,
            calls: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check the configured limit for `client_id`. True means reject.
    pub fn is_limited(&self, client_id: &str) -> bool {
        self.is_rate_limited(client_id, self.config.max_requests, self.config.window())
    }

    /// Counts a request and reports whether it exceeds `max_requests`
    /// within `window`.
    pub fn is_rate_limited(&self, client_id: &str, max_requests: u32, window: Duration) -> bool {
        self.is_rate_limited_at(
            client_id,
            max_requests,
            window.as_millis() as i64,
            chrono::Utc::now().timestamp_millis(),
        )
    }

    /// [`Self::is_rate_limited`] with an explicit clock.
    pub fn is_rate_limited_at(
        &self,
        client_id: &str,
        max_requests: u32,
        window_ms: i64,
        now_ms: i64,
    ) -> bool {
        let mut step = |existing: Option<ClientRequestRecord>| match existing {
            Some(record) if now_ms - record.window_start_ms < window_ms => ClientRequestRecord {
                count: record.count.saturating_add(1),
                ..record
            },
            _ => ClientRequestRecord::fresh(now_ms),
        };
        let record = self.store.update(client_id, &mut step);

        if self.calls.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.sweep_at(now_ms, window_ms);
        }

        record.count > max_requests
    }

    /// Drops records older than the configured window.
    pub fn cleanup_stale(&self) -> usize {
        self.sweep_at(
            chrono::Utc::now().timestamp_millis(),
            self.config.window_ms as i64,
        )
    }

    pub fn sweep_at(&self, now_ms: i64, window_ms: i64) -> usize {
        let removed = self.store.sweep(now_ms, window_ms);
        let remaining = self.store.len();
        metrics().tracked_clients.set(remaining as u64);
        if removed > 0 {
            debug!(removed, remaining, "Swept rate limit records");
        }
        removed
    }

    pub fn tracked_clients(&self) -> usize {
        self.store.len()
    }
}

/// Shared rate limiter state.
pub type SharedRateLimiter = Arc<RateLimiter>;
