//! Best-effort per-minute rate limiter for Gemini calls.
//!
//! Free-tier quotas differ per model family (pro models are far lower), so the
//! limit is derived from the model id. This is a soft throttle: counters live
//! in process memory and reset on restart.

use std::time::{SystemTime, UNIX_EPOCH};

/// Rolling window length.
const WINDOW_MS: u64 = 60_000;

/// Requests per window for non-pro models.
pub const DEFAULT_REQUEST_LIMIT: u32 = 12;

/// Requests per window for pro-tier models (e.g. gemini-1.5-pro-latest).
pub const PRO_REQUEST_LIMIT: u32 = 2;

/// Requests-per-minute limit for a model id.
pub fn limit_for(model: &str) -> u32 {
    if model.contains("-pro-") {
        PRO_REQUEST_LIMIT
    } else {
        DEFAULT_REQUEST_LIMIT
    }
}

/// Counter over a rolling one-minute window. Not internally synchronized;
/// the gateway keeps it behind a mutex.
#[derive(Debug)]
pub struct RateLimiter {
    count: u32,
    window_start_ms: u64,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            count: 0,
            window_start_ms: now_ms(),
        }
    }

    /// Try to take one request slot for the given model. Returns false when
    /// the window's budget is already spent; a denied call does not count.
    pub fn try_acquire(&mut self, model: &str) -> bool {
        self.try_acquire_at(model, now_ms())
    }

    /// As [`try_acquire`](Self::try_acquire) but with an explicit clock, for tests.
    pub fn try_acquire_at(&mut self, model: &str, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.window_start_ms) >= WINDOW_MS {
            self.count = 0;
            self.window_start_ms = now_ms;
        }
        if self.count >= limit_for(model) {
            return false;
        }
        self.count += 1;
        true
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
