//! Monotonic clock adapter.
//!
//! The alert loop never reads a clock; the host event loop samples this
//! one and passes `now_ms` into every call.

use std::time::{Duration, Instant};

/// Milliseconds since construction, backed by `std::time::Instant`.
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since construction (monotonic).
    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Time left until `deadline_ms`, zero if it already passed.
    pub fn until(&self, deadline_ms: u64) -> Duration {
        Duration::from_millis(deadline_ms.saturating_sub(self.now_ms()))
    }
}
