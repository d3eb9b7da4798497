// Timeout limit handler
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::error::{ConfigError, ConfigResult};
use crate::limit::{LimitDecision, LimitExceeded, LimitHandler};
use crate::trace::TraceHook;

/// Stops retrying once more than `timeout` has passed since the first attempt
///
/// Elapsed time is only measured when a failure is handled, on the calling
/// thread. Total time spent retrying can therefore exceed the timeout by up
/// to one attempt plus one backoff delay.
#[derive(Debug)]
pub struct TimeoutLimitHandler {
    timeout: Duration,
    started_at: OnceLock<Instant>,
    clock: Arc<dyn Clock>,
    trace: TraceHook,
}

impl TimeoutLimitHandler {
    /// Create a handler measuring against the system clock
    pub fn new(timeout: Duration) -> ConfigResult<Self> {
        Self::with_clock(timeout, Arc::new(SystemClock))
    }

    /// Create a handler with a custom clock (for testing)
    pub fn with_clock(timeout: Duration, clock: Arc<dyn Clock>) -> ConfigResult<Self> {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout { value: timeout });
        }
        Ok(Self { timeout, started_at: OnceLock::new(), clock, trace: TraceHook::disabled() })
    }

    /// Attach a trace hook
    #[must_use]
    pub fn with_trace(mut self, trace: TraceHook) -> Self {
        self.trace = trace;
        self
    }

    /// Configured timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Time since the first `pre_exec`, or zero if none has happened yet
    pub fn elapsed(&self) -> Duration {
        self.started_at
            .get()
            .map_or(Duration::ZERO, |start| self.clock.now().saturating_duration_since(*start))
    }
}

impl LimitHandler for TimeoutLimitHandler {
    fn pre_exec(&self) {
        // First caller wins; later calls keep the original start.
        self.started_at.get_or_init(|| self.clock.now());
    }

    fn handle_failure(&self, _error: &dyn fmt::Debug) -> LimitDecision {
        let elapsed = self.elapsed();
        if elapsed > self.timeout {
            let timeout = self.timeout;
            self.trace.trace(|| format!("Exceeded Timeout of {timeout:?}"));
            return LimitDecision::Abort(LimitExceeded::Timeout { timeout, elapsed });
        }

        self.trace.trace(|| format!("Remaining time: {:?}", self.timeout - elapsed));
        LimitDecision::Continue
    }

    fn fresh(&self) -> Arc<dyn LimitHandler> {
        Arc::new(Self {
            timeout: self.timeout,
            started_at: OnceLock::new(),
            clock: Arc::clone(&self.clock),
            trace: self.trace.clone(),
        })
    }
}
