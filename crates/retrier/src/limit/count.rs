// Retry-count limit handler
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::constants::MIN_RETRY_COUNT;
use crate::error::{ConfigError, ConfigResult};
use crate::limit::{LimitDecision, LimitExceeded, LimitHandler};
use crate::trace::TraceHook;

/// Allows at most `max_retries` retries after the initial attempt
///
/// An always-failing operation is therefore invoked `max_retries + 1` times.
#[derive(Debug)]
pub struct RetryCountLimitHandler {
    max_retries: u32,
    attempts: AtomicU32,
    trace: TraceHook,
}

impl RetryCountLimitHandler {
    /// Create a handler; `max_retries` must be positive
    pub fn new(max_retries: u32) -> ConfigResult<Self> {
        if max_retries < MIN_RETRY_COUNT {
            return Err(ConfigError::InvalidRetryCount { value: max_retries });
        }
        Ok(Self { max_retries, attempts: AtomicU32::new(0), trace: TraceHook::disabled() })
    }

    /// Attach a trace hook
    #[must_use]
    pub fn with_trace(mut self, trace: TraceHook) -> Self {
        self.trace = trace;
        self
    }

    /// Configured retry limit
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Attempts started so far
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Acquire)
    }
}

impl LimitHandler for RetryCountLimitHandler {
    fn pre_exec(&self) {
        // Saturates at u32::MAX.
        let _ = self.attempts.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
            current.checked_add(1)
        });
    }

    fn handle_failure(&self, _error: &dyn fmt::Debug) -> LimitDecision {
        let retries_made = self.attempts().saturating_sub(1);
        if retries_made >= self.max_retries {
            let max_retries = self.max_retries;
            self.trace.trace(|| format!("Exceeded Max Retries: {max_retries}"));
            return LimitDecision::Abort(LimitExceeded::RetryCount { max_retries });
        }

        self.trace.trace(|| format!("Retry Count: {}/{}", retries_made + 1, self.max_retries));
        LimitDecision::Continue
    }

    fn fresh(&self) -> Arc<dyn LimitHandler> {
        Arc::new(Self {
            max_retries: self.max_retries,
            attempts: AtomicU32::new(0),
            trace: self.trace.clone(),
        })
    }
}
