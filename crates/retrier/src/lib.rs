//! Blocking retry executor with pluggable limit handlers.
//!
//! A [`Retrier`] runs a fallible operation on the calling thread until it
//! succeeds or one of its limit handlers decides that enough is enough. Between
//! attempts it sleeps according to a [`Backoff`] policy, and every step can be
//! reported to an optional [`Tracer`].
//!
//! # Building Blocks
//!
//! - [`backoff`]: delay calculation (none, fixed, exponential with cap)
//! - [`limit`]: retry-count, timeout, and composite limit handlers
//! - [`trace`]: lazily-formatted diagnostic hook
//! - [`config`]: validated, immutable retry configuration
//! - [`retrier`]: the retry loop itself
//!
//! # Feature Flags
//!
//! - `serde`: load [`RetrySettings`] from TOML
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use retrier::{Retrier, RetryConfig};
//!
//! let config = RetryConfig::builder()
//!     .retry_count(3)
//!     .exp_backoff_with_max(Duration::from_millis(1), Duration::from_millis(4))
//!     .build()?;
//! let retrier = Retrier::new(config)?;
//!
//! let mut calls = 0;
//! let value = retrier.execute(|| {
//!     calls += 1;
//!     if calls < 3 { Err("not yet") } else { Ok(calls) }
//! });
//! assert_eq!(value, Ok(3));
//! # Ok::<(), retrier::ConfigError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod backoff;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod limit;
pub mod metrics;
pub mod retrier;
#[cfg(feature = "serde")]
pub mod settings;
pub mod trace;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use backoff::Backoff;
pub use clock::{Clock, MockClock, SystemClock};
pub use config::{HandlerScope, RetryConfig, RetryConfigBuilder};
pub use error::{ConfigError, ConfigResult};
pub use limit::{
    CompositeLimitHandler, LimitDecision, LimitExceeded, LimitHandler, RetryCountLimitHandler,
    TimeoutLimitHandler,
};
pub use metrics::RetryMetrics;
pub use retrier::Retrier;
#[cfg(feature = "serde")]
pub use settings::{BackoffKind, BackoffSettings, RetrySettings};
pub use trace::{FnTracer, LogTracer, TraceHook, Tracer};
