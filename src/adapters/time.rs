//! Monotonic time adapter.
//!
//! The link core takes time as plain `now_ms: u64`; this is where the
//! binary gets it from.

use std::time::Instant;

/// Milliseconds since construction.  `Copy` so each loop task can hold
/// its own.
#[derive(Debug, Clone, Copy)]
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

    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
