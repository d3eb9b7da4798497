// Metrics for a single retry execution
use std::fmt;
use std::time::Duration;

use crate::limit::LimitExceeded;

/// Metrics collected during one `execute` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryMetrics {
    /// Number of times the operation was invoked
    pub attempts: u32,
    /// Total backoff delay slept across all retries
    pub total_delay: Duration,
    /// Whether the operation ultimately succeeded
    pub succeeded: bool,
    /// Limit that stopped the loop, if one did
    pub limit_exceeded: Option<LimitExceeded>,
}

impl RetryMetrics {
    /// Create new metrics with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Retries made after the first attempt
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }

    /// Get the average delay between attempts
    pub fn average_delay(&self) -> Option<Duration> {
        if self.attempts <= 1 {
            None
        } else {
            Some(self.total_delay / (self.attempts - 1))
        }
    }

    /// Whether a timeout limit ended the loop
    pub fn timed_out(&self) -> bool {
        matches!(self.limit_exceeded, Some(LimitExceeded::Timeout { .. }))
    }
}

impl fmt::Display for RetryMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RetryMetrics {{ attempts: {}, total_delay: {:?}, succeeded: {}, limit_exceeded: {} }}",
            self.attempts,
            self.total_delay,
            self.succeeded,
            self.limit_exceeded.map_or_else(|| "none".to_string(), |limit| limit.to_string())
        )
    }
}
