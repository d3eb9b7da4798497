//! The retry loop.
//!
//! [`Retrier::execute`] runs an operation on the calling thread:
//!
//! 1. `pre_exec` on the limit handler
//! 2. invoke the operation; success returns immediately
//! 3. on failure ask the handler; `Abort` returns the original error
//! 4. otherwise sleep for the backoff delay and go again
//!
//! The retrier never caps iterations on its own. Without a retry count or a
//! timeout a failing operation is retried forever.
//!
//! # Shared state
//!
//! With [`HandlerScope::Shared`] (the default) the limit handlers belong to the
//! `Retrier`, so concurrent `execute` calls on one instance draw from the same
//! retry count and the same timeout window. Use [`HandlerScope::PerCall`] for
//! independent limits per call.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::backoff::Backoff;
use crate::clock::{Clock, SystemClock};
use crate::config::{HandlerScope, RetryConfig};
use crate::constants::UNNAMED_OPERATION;
use crate::error::ConfigResult;
use crate::limit::{
    CompositeLimitHandler, LimitDecision, LimitExceeded, LimitHandler, RetryCountLimitHandler,
    TimeoutLimitHandler,
};
use crate::metrics::RetryMetrics;
use crate::trace::TraceHook;

/// Type alias for retry result with metrics (clippy::type_complexity)
type RetryResultWithMetrics<T, E> = (Result<T, E>, RetryMetrics);

/// Blocking retry executor
///
/// Clones share the limit handlers of the original. Under
/// [`HandlerScope::Shared`] a clone draws from the same retry count and
/// timeout window; build a new `Retrier` for independent limits.
#[derive(Debug, Clone)]
pub struct Retrier {
    limit: Option<Arc<dyn LimitHandler>>,
    backoff: Backoff,
    scope: HandlerScope,
    clock: Arc<dyn Clock>,
    trace: TraceHook,
}

impl Retrier {
    /// Build a retrier from a validated configuration
    pub fn new(config: RetryConfig) -> ConfigResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build a retrier with a custom clock (for testing)
    pub fn with_clock(config: RetryConfig, clock: Arc<dyn Clock>) -> ConfigResult<Self> {
        let trace = TraceHook::from_option(config.tracer().cloned());

        let mut handlers: Vec<Arc<dyn LimitHandler>> = Vec::with_capacity(2);
        if let Some(max_retries) = config.max_retries() {
            let handler = RetryCountLimitHandler::new(max_retries)?.with_trace(trace.clone());
            handlers.push(Arc::new(handler));
        }
        if let Some(timeout) = config.timeout() {
            let handler = TimeoutLimitHandler::with_clock(timeout, Arc::clone(&clock))?
                .with_trace(trace.clone());
            handlers.push(Arc::new(handler));
        }

        let limit: Option<Arc<dyn LimitHandler>> = match handlers.len() {
            0 => {
                warn!(
                    "Retrier configured without retry count or timeout; a failing operation will \
                     be retried forever"
                );
                None
            }
            1 => handlers.pop(),
            _ => Some(Arc::new(CompositeLimitHandler::new(handlers))),
        };

        debug!(
            max_retries = ?config.max_retries(),
            timeout = ?config.timeout(),
            backoff = ?config.backoff(),
            scope = ?config.scope(),
            tracing = trace.is_enabled(),
            "Retrier created"
        );

        Ok(Self { limit, backoff: config.backoff(), scope: config.scope(), clock, trace })
    }

    /// Build a retrier around a custom limit handler chain
    pub fn from_handler(
        limit: Arc<dyn LimitHandler>,
        backoff: Backoff,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            limit: Some(limit),
            backoff,
            scope: HandlerScope::Shared,
            clock,
            trace: TraceHook::disabled(),
        }
    }

    /// Replace the handler sharing policy
    #[must_use]
    pub fn with_scope(mut self, scope: HandlerScope) -> Self {
        self.scope = scope;
        self
    }

    /// Replace the trace hook used by the loop itself
    #[must_use]
    pub fn with_trace(mut self, trace: TraceHook) -> Self {
        self.trace = trace;
        self
    }

    /// Delay policy between attempts
    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Handler sharing policy
    pub fn scope(&self) -> HandlerScope {
        self.scope
    }

    /// Shared limit handler chain, if any
    pub fn limit_handler(&self) -> Option<&Arc<dyn LimitHandler>> {
        self.limit.as_ref()
    }

    /// Run `operation` until it succeeds or a limit is reached
    ///
    /// On abort the error from the last attempt is returned unchanged.
    pub fn execute<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: fmt::Debug,
    {
        self.execute_with_metrics(UNNAMED_OPERATION, operation).0
    }

    /// Run `operation` with retry logic and report metrics
    pub fn execute_with_metrics<T, E, F>(
        &self,
        operation_name: &str,
        mut operation: F,
    ) -> RetryResultWithMetrics<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: fmt::Debug,
    {
        let limit = self.resolve_limit();
        let mut metrics = RetryMetrics::new();
        let mut attempt: u32 = 0;

        debug!(operation = operation_name, scope = ?self.scope, "Starting retry operation");

        loop {
            if let Some(limit) = limit.as_ref() {
                limit.pre_exec();
            }
            attempt = attempt.saturating_add(1);
            metrics.attempts = attempt;

            let failure = match operation() {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(
                            operation = operation_name,
                            attempts = attempt,
                            total_delay = ?metrics.total_delay,
                            "Retry operation succeeded"
                        );
                        self.trace.trace(|| format!("Succeeded after {attempt} attempts"));
                    }
                    metrics.succeeded = true;
                    return (Ok(value), metrics);
                }
                Err(failure) => failure,
            };

            let decision =
                limit.as_ref().map_or(LimitDecision::Continue, |limit| limit.handle_failure(&failure));

            if let LimitDecision::Abort(reason) = decision {
                log_abort(operation_name, &metrics, reason, &failure);
                self.trace.trace(|| format!("Giving up after {attempt} attempts: {reason}"));
                metrics.limit_exceeded = Some(reason);
                return (Err(failure), metrics);
            }

            let delay = self.backoff.delay(attempt);
            debug!(
                operation = operation_name,
                attempt,
                delay = ?delay,
                error = ?failure,
                "Operation failed, retrying"
            );
            self.trace.trace(|| format!("Attempt {attempt} failed, retrying in {delay:?}"));

            if !delay.is_zero() {
                self.clock.sleep(delay);
                metrics.total_delay = metrics.total_delay.saturating_add(delay);
            }
        }
    }

    fn resolve_limit(&self) -> Option<Arc<dyn LimitHandler>> {
        match self.scope {
            HandlerScope::Shared => self.limit.clone(),
            HandlerScope::PerCall => self.limit.as_ref().map(|limit| limit.fresh()),
        }
    }
}

fn log_abort(
    operation_name: &str,
    metrics: &RetryMetrics,
    reason: LimitExceeded,
    failure: &dyn fmt::Debug,
) {
    match reason {
        LimitExceeded::RetryCount { .. } => error!(
            operation = operation_name,
            attempts = metrics.attempts,
            total_delay = ?metrics.total_delay,
            last_error = ?failure,
            "All retry attempts failed"
        ),
        LimitExceeded::Timeout { elapsed, .. } => warn!(
            operation = operation_name,
            attempts = metrics.attempts,
            elapsed = ?elapsed,
            last_error = ?failure,
            "Retry operation timed out"
        ),
        LimitExceeded::Custom { reason } => warn!(
            operation = operation_name,
            attempts = metrics.attempts,
            reason,
            last_error = ?failure,
            "Retry operation stopped by limit handler"
        ),
    }
}
