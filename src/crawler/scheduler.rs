//! Scheduling policy for the worker pool
//!
//! This module handles:
//! - Adaptive concurrency between the configured minimum and maximum
//! - Exponential backoff for retried tasks

use crate::config::CrawlerConfig;
use std::time::Duration;

/// Largest backoff exponent; later attempts wait as long as this one
const MAX_BACKOFF_EXPONENT: u32 = 6;

/// Adaptive limit on concurrently running tasks
///
/// The pool starts at the minimum, grows by one after every successful task
/// and halves after a retryable failure, never leaving `[min, max]`.
#[derive(Debug, Clone)]
pub struct ConcurrencyGovernor {
    min: usize,
    max: usize,
    current: usize,
}

impl ConcurrencyGovernor {
    pub fn new(min: usize, max: usize) -> Self {
        let max = max.max(1);
        let min = min.clamp(1, max);
        Self {
            min,
            max,
            current: min,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.min_concurrency as usize,
            config.max_concurrency as usize,
        )
    }

    /// Number of tasks that may run at once
    pub fn limit(&self) -> usize {
        self.current
    }

    pub fn on_success(&mut self) {
        if self.current < self.max {
            self.current += 1;
        }
    }

    pub fn on_retryable_failure(&mut self) {
        let reduced = (self.current / 2).max(self.min);
        if reduced < self.current {
            tracing::debug!(
                "Reducing concurrency from {} to {}",
                self.current,
                reduced
            );
        }
        self.current = reduced;
    }
}

/// Delay before re-fetching a task on its `attempt`-th retry
///
/// `base * 2^(attempt - 1)`; attempt 0 (the first fetch) never waits.
pub fn retry_backoff(base: Duration, attempt: u32) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exponent = (attempt - 1).min(MAX_BACKOFF_EXPONENT);
    base.saturating_mul(1 << exponent)
}
