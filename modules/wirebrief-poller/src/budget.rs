//! Wall-clock budgets for bounded runs.

use std::time::{Duration, Instant};

use tracing::warn;

/// Elapsed-time limit checked at unit boundaries. In-flight work is never
/// cancelled; the budget only stops new work from starting.
#[derive(Debug, Clone)]
pub struct TimeBudget {
    limit: Option<Duration>,
    started: Instant,
}

impl TimeBudget {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit: Some(limit),
            started: Instant::now(),
        }
    }

    pub fn unlimited() -> Self {
        Self {
            limit: None,
            started: Instant::now(),
        }
    }

    pub fn from_secs(limit_secs: Option<u64>) -> Self {
        match limit_secs {
            Some(secs) => Self::new(Duration::from_secs(secs)),
            None => Self::unlimited(),
        }
    }

    pub fn exhausted(&self) -> bool {
        match self.limit {
            Some(limit) => self.started.elapsed() >= limit,
            None => false,
        }
    }

    /// Like [`exhausted`](Self::exhausted), but logs which budget tripped.
    pub fn check(&self, what: &str) -> bool {
        if self.exhausted() {
            warn!(
                budget = what,
                elapsed_secs = self.started.elapsed().as_secs(),
                "Time budget exhausted"
            );
            return true;
        }
        false
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
