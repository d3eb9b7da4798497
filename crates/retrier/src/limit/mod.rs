//! Limit handlers decide whether another attempt is allowed.
//!
//! Every handler has two hooks:
//!
//! - [`LimitHandler::pre_exec`] runs before each attempt and updates internal
//!   counters. It never aborts.
//! - [`LimitHandler::handle_failure`] runs after a failed attempt and returns
//!   a [`LimitDecision`]. The handler only borrows the failure, so the retrier
//!   always hands the caller the original error on abort.
//!
//! Handler state lives behind atomics. A single handler shared by several
//! threads counts attempts and elapsed time across all of them; see
//! [`HandlerScope`](crate::HandlerScope) for per-call isolation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

mod composite;
mod count;
mod timeout;

pub use composite::CompositeLimitHandler;
pub use count::RetryCountLimitHandler;
pub use timeout::TimeoutLimitHandler;

/// Which limit stopped the retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitExceeded {
    /// The configured number of retries has been used up
    RetryCount {
        /// Configured retry limit
        max_retries: u32,
    },
    /// More time than allowed has passed since the first attempt
    Timeout {
        /// Configured timeout
        timeout: Duration,
        /// Time measured when the limit tripped
        elapsed: Duration,
    },
    /// A caller-defined handler stopped the loop
    Custom {
        /// Short static description from the handler
        reason: &'static str,
    },
}

impl fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryCount { max_retries } => write!(f, "exceeded max retries: {max_retries}"),
            Self::Timeout { timeout, elapsed } => {
                write!(f, "exceeded timeout of {timeout:?} (elapsed {elapsed:?})")
            }
            Self::Custom { reason } => write!(f, "limit reached: {reason}"),
        }
    }
}

/// Outcome of a limit check after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitDecision {
    /// Another attempt is permitted
    Continue,
    /// Stop retrying and return the failure to the caller
    Abort(LimitExceeded),
}

impl LimitDecision {
    /// Whether this decision stops the retry loop
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Abort(_))
    }
}

/// Capability deciding whether the retry loop may continue
pub trait LimitHandler: Send + Sync + fmt::Debug {
    /// Called once before every attempt
    fn pre_exec(&self);

    /// Called after a failed attempt
    fn handle_failure(&self, error: &dyn fmt::Debug) -> LimitDecision;

    /// A handler with the same limits and zeroed state
    fn fresh(&self) -> Arc<dyn LimitHandler>;
}
