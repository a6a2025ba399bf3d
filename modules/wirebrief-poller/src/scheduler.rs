//! Poll cadence with idle backoff.
//!
//! Cycles that find mail sleep roughly the base interval. Empty cycles
//! stretch the next sleep by half again, up to a ceiling, and any hit
//! resets the stretch. Both sleeps carry a few seconds of jitter.

use std::time::Duration;

use rand::Rng;

/// Grow an idle interval by half, truncating, capped at `max_secs`.
fn next_backoff(current_secs: u64, max_secs: u64) -> u64 {
    ((current_secs * 3) / 2).min(max_secs)
}

#[derive(Debug)]
pub struct PollSchedule {
    base_secs: u64,
    max_secs: u64,
    idle_secs: u64,
}

impl PollSchedule {
    pub fn new(base_secs: u64, max_secs: u64) -> Self {
        Self {
            base_secs,
            max_secs,
            idle_secs: base_secs,
        }
    }

    /// Sleep duration after an empty cycle. Advances the backoff, then adds
    /// up to five seconds of jitter (less when the interval itself is short).
    pub fn idle_sleep(&mut self) -> Duration {
        self.idle_secs = next_backoff(self.idle_secs, self.max_secs);
        let jitter_cap = self.idle_secs.min(5);
        let jitter = rand::rng().random_range(0..=jitter_cap);
        Duration::from_secs(self.idle_secs + jitter)
    }

    /// Sleep duration after a cycle that found mail.
    pub fn active_sleep(&self) -> Duration {
        let jitter = rand::rng().random_range(0..=3);
        Duration::from_secs(self.base_secs + jitter)
    }

    /// Drop back to the base interval after mail shows up.
    pub fn reset(&mut self) {
        self.idle_secs = self.base_secs;
    }

    pub fn current_idle_secs(&self) -> u64 {
        self.idle_secs
    }
}
