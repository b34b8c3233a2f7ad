//! Exponential backoff for rate-limited requests
//!
//! The wait after the Nth consecutive rate-limit response is
//! `min(initial * 2^(N-1), max)`.

use crate::config::RateLimitConfig;
use std::time::Duration;

/// Bounded retry state for one query
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    consecutive: u32,
}

impl Backoff {
    /// Creates a backoff starting at `initial` and capped at `max`
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            consecutive: 0,
        }
    }

    /// Creates a backoff from the rate-limit configuration
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            Duration::from_millis(config.backoff_initial_ms),
            Duration::from_millis(config.backoff_max_ms),
        )
    }

    /// Wait after `hits` consecutive rate-limit responses
    ///
    /// Returns `Duration::ZERO` when `hits` is 0.
    pub fn delay_for(&self, hits: u32) -> Duration {
        if hits == 0 {
            return Duration::ZERO;
        }

        2u32.checked_pow(hits - 1)
            .and_then(|factor| self.initial.checked_mul(factor))
            .map_or(self.max, |delay| delay.min(self.max))
    }

    /// Records one more rate-limit hit and returns the wait before retrying
    pub fn next_delay(&mut self) -> Duration {
        self.consecutive = self.consecutive.saturating_add(1);
        self.delay_for(self.consecutive)
    }

    /// Number of consecutive rate-limit hits recorded so far
    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }
}
