//! Reconnect backoff policy
//!
//! Deterministic doubling with a cap: `delay = min(base * 2^retries, max)`.
//! No jitter is applied, so consecutive delays are reproducible in tests.

use std::time::Duration;

/// Exponential backoff schedule for reconnection attempts
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
}

impl Backoff {
    /// Create a schedule with the given base and cap
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    /// Delay before the attempt following `retry_count` failed attempts
    pub fn delay(&self, retry_count: u32) -> Duration {
        let factor = match 2u32.checked_pow(retry_count) {
            Some(f) => f,
            None => return self.max,
        };
        self.base.saturating_mul(factor).min(self.max)
    }
}
