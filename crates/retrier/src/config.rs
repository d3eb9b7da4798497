//! Immutable retry configuration and its fluent builder.
//!
//! ```
//! use std::time::Duration;
//!
//! use retrier::{HandlerScope, RetryConfig};
//!
//! let config = RetryConfig::builder()
//!     .retry_count(5)
//!     .timeout(Duration::from_secs(2))
//!     .exp_backoff_with_max(Duration::from_millis(50), Duration::from_secs(1))
//!     .handler_scope(HandlerScope::PerCall)
//!     .build()?;
//!
//! assert_eq!(config.max_retries(), Some(5));
//! assert!(config.is_bounded());
//! # Ok::<(), retrier::ConfigError>(())
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::backoff::Backoff;
use crate::constants::MIN_RETRY_COUNT;
use crate::error::{ConfigError, ConfigResult};
use crate::trace::Tracer;

/// How limit-handler state is shared between `execute` calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum HandlerScope {
    /// One set of counters per `Retrier`; concurrent calls consume the same
    /// retry count and timeout window
    #[default]
    Shared,
    /// Fresh counters for every `execute` call
    PerCall,
}

/// Validated retry configuration, frozen once built
#[derive(Clone, Default)]
pub struct RetryConfig {
    max_retries: Option<u32>,
    timeout: Option<Duration>,
    backoff: Backoff,
    tracer: Option<Arc<dyn Tracer>>,
    scope: HandlerScope,
}

impl RetryConfig {
    /// Start building a configuration
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Maximum retries after the first attempt, if limited
    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    /// Overall retry timeout, if limited
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Delay policy between attempts
    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Attached tracer, if any
    pub fn tracer(&self) -> Option<&Arc<dyn Tracer>> {
        self.tracer.as_ref()
    }

    /// Handler state sharing policy
    pub fn scope(&self) -> HandlerScope {
        self.scope
    }

    /// Whether at least one limit is configured
    ///
    /// An unbounded configuration retries a failing operation forever.
    pub fn is_bounded(&self) -> bool {
        self.max_retries.is_some() || self.timeout.is_some()
    }
}

impl fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_retries", &self.max_retries)
            .field("timeout", &self.timeout)
            .field("backoff", &self.backoff)
            .field("tracer", &self.tracer.as_ref().map(|_| "<tracer>"))
            .field("scope", &self.scope)
            .finish()
    }
}

/// Builder for [`RetryConfig`] with fluent API
///
/// Setters never fail; every value is validated by [`build`](Self::build).
#[derive(Default)]
pub struct RetryConfigBuilder {
    max_retries: Option<u32>,
    timeout: Option<Duration>,
    // Unvalidated until `build`
    backoff: Backoff,
    tracer: Option<Arc<dyn Tracer>>,
    scope: HandlerScope,
}

impl RetryConfigBuilder {
    /// Start from an unbounded configuration with no backoff
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of retries after the first attempt
    pub fn retry_count(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Limit the total time spent retrying
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Exponential backoff doubling from `base` without a cap
    pub fn exp_backoff(mut self, base: Duration) -> Self {
        self.backoff = Backoff::Exponential { base, max: None };
        self
    }

    /// Exponential backoff doubling from `base`, capped at `max`
    pub fn exp_backoff_with_max(mut self, base: Duration, max: Duration) -> Self {
        self.backoff = Backoff::Exponential { base, max: Some(max) };
        self
    }

    /// Constant delay between attempts
    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.backoff = Backoff::Fixed(delay);
        self
    }

    /// Report diagnostics to `tracer`
    pub fn tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Choose how limit-handler state is shared between calls
    pub fn handler_scope(mut self, scope: HandlerScope) -> Self {
        self.scope = scope;
        self
    }

    /// Validate and freeze the configuration
    pub fn build(self) -> ConfigResult<RetryConfig> {
        if let Some(max_retries) = self.max_retries {
            if max_retries < MIN_RETRY_COUNT {
                return Err(ConfigError::InvalidRetryCount { value: max_retries });
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(ConfigError::InvalidTimeout { value: timeout });
            }
        }

        let backoff = self.backoff.validate()?;

        Ok(RetryConfig {
            max_retries: self.max_retries,
            timeout: self.timeout,
            backoff,
            tracer: self.tracer,
            scope: self.scope,
        })
    }
}

impl fmt::Debug for RetryConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfigBuilder")
            .field("max_retries", &self.max_retries)
            .field("timeout", &self.timeout)
            .field("backoff", &self.backoff)
            .field("tracer", &self.tracer.is_some())
            .field("scope", &self.scope)
            .finish()
    }
}
