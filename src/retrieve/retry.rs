//! Retry policy with linear backoff for failed fetch attempts.
//!
//! Every classified fetch failure is retryable; the policy only decides
//! whether attempts remain and how long to wait. The wait grows linearly:
//! the sleep after attempt `n` is `n` times the backoff unit.

use std::time::Duration;

use tracing::debug;

use super::constants::{DEFAULT_BACKOFF_UNIT, DEFAULT_MAX_ATTEMPTS};

/// Decision on whether to retry a failed fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so the first retry is attempt 2).
        attempt: u32,
    },

    /// Attempts are exhausted; surface the last failure.
    GiveUp,
}

/// Configuration for retry behavior with linear backoff.
///
/// # Delay Calculation
///
/// ```text
/// delay = attempt * backoff_unit
/// ```
///
/// With the defaults (3 attempts, 5 second unit), a fully failing retrieval
/// sleeps 5s then 10s before the final attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Base wait multiplied by the attempt number that just failed.
    backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy.
    ///
    /// `max_attempts` is clamped to at least 1; the initial attempt always runs.
    #[must_use]
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_unit,
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the configured backoff unit.
    #[must_use]
    pub fn backoff_unit(&self) -> Duration {
        self.backoff_unit
    }

    /// Decides what to do after attempt number `attempt` (1-indexed) failed.
    #[must_use]
    pub fn should_retry(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::GiveUp;
        }

        let delay = self.delay_for_attempt(attempt);
        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    /// Calculates the linear backoff delay after the given failed attempt.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_unit.saturating_mul(attempt)
    }
}
