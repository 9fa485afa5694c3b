//! # Fibonacci Backoff
//!
//! Delay between failed scans in periodic mode. Grows like the Fibonacci
//! sequence, in seconds, capped at a maximum: 30s, 30s, 60s, 90s, 150s ...
//!
//! A successful scan resets the sequence and the scanner goes back to its
//! regular interval.

use std::time::Duration;

/// Fibonacci backoff calculator
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    /// First value, restored on reset
    min_seconds: u64,
    prev_seconds: u64,
    current_seconds: u64,
    max_seconds: u64,
}

impl FibonacciBackoff {
    /// Creates a backoff starting at `min_seconds` and capped at `max_seconds`.
    #[must_use]
    pub fn new(min_seconds: u64, max_seconds: u64) -> Self {
        Self {
            min_seconds,
            prev_seconds: 0,
            current_seconds: min_seconds,
            max_seconds,
        }
    }

    /// Returns the current delay and advances the sequence.
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current_seconds;

        let next = self.prev_seconds.saturating_add(self.current_seconds);
        self.prev_seconds = self.current_seconds;
        self.current_seconds = std::cmp::min(next, self.max_seconds);

        Duration::from_secs(result)
    }

    /// Resets to the first value after a successful scan
    pub fn reset(&mut self) {
        self.prev_seconds = 0;
        self.current_seconds = self.min_seconds;
    }
}
