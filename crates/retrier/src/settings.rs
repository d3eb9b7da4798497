//! File-based retry settings.
//!
//! Settings are plain data read from TOML; turning them into a
//! [`RetryConfig`] runs the same validation as the programmatic builder.
//! Durations are given in milliseconds.
//!
//! ```
//! use retrier::RetrySettings;
//!
//! let settings = RetrySettings::from_toml_str(
//!     r#"
//!     max_retries = 3
//!     timeout_ms = 5000
//!     scope = "per-call"
//!
//!     [backoff]
//!     base_ms = 100
//!     max_ms = 2000
//!     "#,
//! )?;
//! let config = settings.into_builder()?.build()?;
//! assert_eq!(config.max_retries(), Some(3));
//! # Ok::<(), retrier::ConfigError>(())
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::config::{HandlerScope, RetryConfig, RetryConfigBuilder};
use crate::error::{ConfigError, ConfigResult};

/// Retry settings as they appear in a configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySettings {
    /// Maximum retries after the first attempt
    #[serde(default)]
    pub max_retries: Option<u32>,
    /// Overall timeout in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Delay policy between attempts
    #[serde(default)]
    pub backoff: Option<BackoffSettings>,
    /// Handler state sharing policy
    #[serde(default)]
    pub scope: HandlerScope,
}

/// Backoff section of [`RetrySettings`]
///
/// `kind = "exponential"` (the default) doubles from `base_ms` and is capped at
/// `max_ms` if present; `kind = "fixed"` waits `base_ms` every time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackoffSettings {
    /// Curve shape; exponential when omitted
    #[serde(default)]
    pub kind: BackoffKind,
    /// Initial (or constant) delay in milliseconds
    pub base_ms: u64,
    /// Upper bound for exponential delays in milliseconds
    #[serde(default)]
    pub max_ms: Option<u64>,
}

/// Shape of the backoff curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackoffKind {
    /// Doubling delay, optionally capped by `max_ms`
    #[default]
    Exponential,
    /// Constant `base_ms` delay; `max_ms` is not allowed
    Fixed,
}

impl RetrySettings {
    /// Parse settings from a TOML document
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        toml::from_str(source).map_err(|err| ConfigError::invalid_settings(err.to_string()))
    }

    /// Seed a builder with these settings; a tracer can still be attached
    ///
    /// Fails when the backoff section combines `kind = "fixed"` with
    /// `max_ms`. Value checks are left to [`RetryConfigBuilder::build`].
    pub fn into_builder(self) -> ConfigResult<RetryConfigBuilder> {
        let mut builder = RetryConfig::builder().handler_scope(self.scope);

        if let Some(max_retries) = self.max_retries {
            builder = builder.retry_count(max_retries);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        if let Some(backoff) = self.backoff {
            let base = Duration::from_millis(backoff.base_ms);
            builder = match (backoff.kind, backoff.max_ms) {
                (BackoffKind::Fixed, None) => builder.fixed_backoff(base),
                (BackoffKind::Fixed, Some(max_ms)) => {
                    return Err(ConfigError::invalid_settings(format!(
                        "max_ms ({max_ms}) cannot be combined with fixed backoff"
                    )));
                }
                (BackoffKind::Exponential, None) => builder.exp_backoff(base),
                (BackoffKind::Exponential, Some(max_ms)) => {
                    builder.exp_backoff_with_max(base, Duration::from_millis(max_ms))
                }
            };
        }

        Ok(builder)
    }

    /// Convert and validate in one step
    pub fn into_config(self) -> ConfigResult<RetryConfig> {
        self.into_builder()?.build()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings.
    use super::*;
    use crate::backoff::Backoff;

    /// Validates parsing a complete settings document.
    ///
    /// Assertions:
    /// - Confirms every field is read.
    #[test]
    fn test_parse_full_settings() {
        let settings = RetrySettings::from_toml_str(
            r#"
            max_retries = 4
            timeout_ms = 1500
            scope = "shared"

            [backoff]
            kind = "exponential"
            base_ms = 50
            max_ms = 400
            "#,
        )
        .unwrap();

        assert_eq!(
            settings,
            RetrySettings {
                max_retries: Some(4),
                timeout_ms: Some(1500),
                backoff: Some(BackoffSettings {
                    kind: BackoffKind::Exponential,
                    base_ms: 50,
                    max_ms: Some(400),
                }),
                scope: HandlerScope::Shared,
            }
        );
    }

    /// Validates that an empty document yields defaults.
    ///
    /// Assertions:
    /// - Confirms no limits and shared scope.
    #[test]
    fn test_empty_settings() {
        let settings = RetrySettings::from_toml_str("").unwrap();
        assert_eq!(settings, RetrySettings::default());
    }

    /// Validates fixed backoff conversion.
    ///
    /// Assertions:
    /// - Confirms `kind = "fixed"` produces a fixed backoff.
    #[test]
    fn test_fixed_backoff_conversion() {
        let config = RetrySettings::from_toml_str(
            r#"
            max_retries = 1
            [backoff]
            kind = "fixed"
            base_ms = 25
            "#,
        )
        .unwrap()
        .into_config()
        .unwrap();

        assert_eq!(config.backoff(), Backoff::Fixed(Duration::from_millis(25)));
    }

    /// Validates that a cap on fixed backoff is rejected.
    ///
    /// Assertions:
    /// - Ensures `kind = "fixed"` with `max_ms` surfaces as `InvalidSettings`
    ///   naming the offending key.
    #[test]
    fn test_fixed_backoff_with_max_rejected() {
        let err = RetrySettings::from_toml_str(
            r#"
            [backoff]
            kind = "fixed"
            base_ms = 25
            max_ms = 100
            "#,
        )
        .unwrap()
        .into_config()
        .unwrap_err();

        match err {
            ConfigError::InvalidSettings { message } => assert!(message.contains("max_ms")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// Validates that unknown keys are rejected.
    ///
    /// Assertions:
    /// - Ensures a typo surfaces as `InvalidSettings`.
    #[test]
    fn test_unknown_field_rejected() {
        let err = RetrySettings::from_toml_str("max_retry = 3").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSettings { .. }));
    }

    /// Validates that conversion applies builder validation.
    ///
    /// Assertions:
    /// - Ensures a zero timeout is rejected on conversion.
    #[test]
    fn test_conversion_validates() {
        let err = RetrySettings { timeout_ms: Some(0), ..RetrySettings::default() }
            .into_config()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidTimeout { value: Duration::ZERO });
    }
}
