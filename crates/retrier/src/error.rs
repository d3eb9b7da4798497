// Error types for retrier configuration
use std::time::Duration;

use thiserror::Error;

/// Errors raised while building a retry configuration or a limit handler.
///
/// These indicate programmer error and are reported synchronously at build
/// time; they are never retried. Failures of the wrapped operation are not
/// represented here: the retrier hands them back to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Retry count below the minimum
    #[error("max retry count must be positive, got {value}")]
    InvalidRetryCount {
        /// Rejected count
        value: u32,
    },

    /// Zero timeout
    #[error("timeout must be positive, got {value:?}")]
    InvalidTimeout {
        /// Rejected timeout
        value: Duration,
    },

    /// Zero base or fixed backoff delay
    #[error("backoff delay must be positive, got {value:?}")]
    InvalidBackoffDelay {
        /// Rejected delay
        value: Duration,
    },

    /// Backoff cap that is zero or below the base delay
    #[error("backoff max delay ({max:?}) must be positive and not less than base delay ({base:?})")]
    InvalidBackoffMaxDelay {
        /// Configured base delay
        base: Duration,
        /// Rejected cap
        max: Duration,
    },

    /// Settings document that could not be parsed or combined
    #[error("invalid retry settings: {message}")]
    InvalidSettings {
        /// Parser or validation message
        message: String,
    },
}

impl ConfigError {
    /// Create a settings error from any displayable parse failure
    pub fn invalid_settings(message: impl Into<String>) -> Self {
        Self::InvalidSettings { message: message.into() }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
