//! Backoff delay calculation.
//!
//! Maps a 1-indexed attempt number to the delay to wait before the next
//! attempt. Exponential backoff doubles every attempt:
//!
//! ```text
//! delay(k) = base * 2^(k-1)          (no cap)
//! delay(k) = min(base * 2^(k-1), max) (with cap)
//! ```
//!
//! Overflow saturates to the cap, or to [`Duration::MAX`] when there is none.

use std::time::Duration;

use crate::constants::{BACKOFF_MULTIPLIER, MAX_BACKOFF_EXPONENT};
use crate::error::{ConfigError, ConfigResult};

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    /// Retry immediately
    #[default]
    None,
    /// Same delay between every attempt
    Fixed(Duration),
    /// Doubling delay starting at `base`, optionally capped at `max`
    Exponential {
        /// Delay after the first failed attempt
        base: Duration,
        /// Upper bound for any single delay
        max: Option<Duration>,
    },
}

impl Backoff {
    /// Fixed delay between attempts
    pub fn fixed(delay: Duration) -> ConfigResult<Self> {
        ensure_positive_delay(delay)?;
        Ok(Self::Fixed(delay))
    }

    /// Uncapped exponential backoff starting at `base`
    pub fn exponential(base: Duration) -> ConfigResult<Self> {
        ensure_positive_delay(base)?;
        Ok(Self::Exponential { base, max: None })
    }

    /// Exponential backoff starting at `base`, never exceeding `max`
    pub fn exponential_with_max(base: Duration, max: Duration) -> ConfigResult<Self> {
        ensure_positive_delay(base)?;
        if max.is_zero() || max < base {
            return Err(ConfigError::InvalidBackoffMaxDelay { base, max });
        }
        Ok(Self::Exponential { base, max: Some(max) })
    }

    /// Check the delays of a directly constructed value
    ///
    /// Applies the same rules as the constructors, so a variant built by hand
    /// is rejected exactly when the matching constructor would fail.
    pub fn validate(self) -> ConfigResult<Self> {
        match self {
            Self::None => Ok(Self::None),
            Self::Fixed(delay) => Self::fixed(delay),
            Self::Exponential { base, max: None } => Self::exponential(base),
            Self::Exponential { base, max: Some(max) } => Self::exponential_with_max(base, max),
        }
    }

    /// Calculate the delay after the given attempt (1-indexed)
    ///
    /// Attempt `0` is treated like attempt `1`.
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Self::None => Duration::ZERO,
            Self::Fixed(delay) => delay,
            Self::Exponential { base, max } => {
                let raw = exponential_delay(base, attempt);
                max.map_or(raw, |cap| raw.min(cap))
            }
        }
    }

    /// Whether this backoff ever sleeps
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

fn exponential_delay(base: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1);
    if exponent > MAX_BACKOFF_EXPONENT {
        return Duration::MAX;
    }

    BACKOFF_MULTIPLIER
        .checked_pow(exponent)
        .and_then(|factor| base.checked_mul(factor))
        .unwrap_or(Duration::MAX)
}

fn ensure_positive_delay(delay: Duration) -> ConfigResult<()> {
    if delay.is_zero() {
        return Err(ConfigError::InvalidBackoffDelay { value: delay });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Unit tests for backoff.
    use proptest::prelude::*;

    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// Validates the uncapped doubling sequence.
    ///
    /// Assertions:
    /// - Confirms attempts 1..4 yield 100ms, 200ms, 400ms, 800ms.
    #[test]
    fn test_exponential_without_cap() {
        let backoff = Backoff::exponential(ms(100)).unwrap();
        let delays: Vec<_> = (1..=4).map(|attempt| backoff.delay(attempt)).collect();
        assert_eq!(delays, vec![ms(100), ms(200), ms(400), ms(800)]);
    }

    /// Validates the capped doubling sequence.
    ///
    /// Assertions:
    /// - Confirms attempts 1..4 yield 100ms, 200ms, 250ms, 250ms.
    #[test]
    fn test_exponential_with_cap() {
        let backoff = Backoff::exponential_with_max(ms(100), ms(250)).unwrap();
        let delays: Vec<_> = (1..=4).map(|attempt| backoff.delay(attempt)).collect();
        assert_eq!(delays, vec![ms(100), ms(200), ms(250), ms(250)]);
    }

    /// Validates `Backoff::None` and `Backoff::Fixed`.
    ///
    /// Assertions:
    /// - Confirms `None` is always zero.
    /// - Confirms `Fixed` ignores the attempt number.
    #[test]
    fn test_none_and_fixed() {
        assert_eq!(Backoff::None.delay(7), Duration::ZERO);
        assert!(Backoff::None.is_none());

        let fixed = Backoff::fixed(ms(30)).unwrap();
        assert_eq!(fixed.delay(1), ms(30));
        assert_eq!(fixed.delay(50), ms(30));
        assert!(!fixed.is_none());
    }

    /// Validates that attempt zero behaves like the first attempt.
    ///
    /// Assertions:
    /// - Confirms `delay(0) == delay(1) == base`.
    #[test]
    fn test_attempt_zero_uses_base() {
        let backoff = Backoff::exponential(ms(100)).unwrap();
        assert_eq!(backoff.delay(0), ms(100));
        assert_eq!(backoff.delay(1), ms(100));
    }

    /// Validates overflow saturation.
    ///
    /// Assertions:
    /// - Confirms huge attempts saturate to the cap when one is configured.
    /// - Confirms huge attempts saturate to `Duration::MAX` without a cap.
    #[test]
    fn test_overflow_saturates() {
        let capped = Backoff::exponential_with_max(Duration::from_secs(1), Duration::from_secs(60))
            .unwrap();
        assert_eq!(capped.delay(u32::MAX), Duration::from_secs(60));
        assert_eq!(capped.delay(64), Duration::from_secs(60));

        let uncapped = Backoff::exponential(Duration::from_secs(u64::MAX / 2)).unwrap();
        assert_eq!(uncapped.delay(3), Duration::MAX);
        assert_eq!(uncapped.delay(u32::MAX), Duration::MAX);
    }

    /// Validates constructor validation.
    ///
    /// Assertions:
    /// - Ensures zero delays are rejected.
    /// - Ensures a max below base is rejected.
    /// - Ensures max equal to base is accepted.
    #[test]
    fn test_constructor_validation() {
        assert_eq!(
            Backoff::fixed(Duration::ZERO),
            Err(ConfigError::InvalidBackoffDelay { value: Duration::ZERO })
        );
        assert!(Backoff::exponential(Duration::ZERO).is_err());
        assert_eq!(
            Backoff::exponential_with_max(ms(200), ms(100)),
            Err(ConfigError::InvalidBackoffMaxDelay { base: ms(200), max: ms(100) })
        );
        assert_eq!(
            Backoff::exponential_with_max(ms(100), ms(100)).unwrap().delay(5),
            ms(100)
        );
    }

    /// Validates `Backoff::validate` on hand-built values.
    ///
    /// Assertions:
    /// - Confirms valid variants pass through unchanged.
    /// - Ensures zero and inverted delays are rejected like the constructors.
    #[test]
    fn test_validate_matches_constructors() {
        assert_eq!(Backoff::None.validate(), Ok(Backoff::None));
        assert_eq!(Backoff::Fixed(ms(10)).validate(), Ok(Backoff::Fixed(ms(10))));
        assert_eq!(
            Backoff::Fixed(Duration::ZERO).validate(),
            Err(ConfigError::InvalidBackoffDelay { value: Duration::ZERO })
        );
        assert_eq!(
            Backoff::Exponential { base: ms(300), max: Some(ms(100)) }.validate(),
            Err(ConfigError::InvalidBackoffMaxDelay { base: ms(300), max: ms(100) })
        );
        assert_eq!(
            Backoff::Exponential { base: ms(100), max: None }.validate(),
            Backoff::exponential(ms(100))
        );
    }

    proptest! {
        /// Capped delay never exceeds the cap and matches `min(base * 2^(k-1), cap)`.
        #[test]
        fn prop_capped_delay_matches_formula(
            base_ms in 1u64..1_000,
            extra_ms in 0u64..100_000,
            attempt in 1u32..20,
        ) {
            let base = ms(base_ms);
            let cap = ms(base_ms + extra_ms);
            let backoff = Backoff::exponential_with_max(base, cap).unwrap();

            let expected = ms(base_ms * (1u64 << (attempt - 1))).min(cap);
            prop_assert_eq!(backoff.delay(attempt), expected);
            prop_assert!(backoff.delay(attempt) <= cap);
        }

        /// Uncapped delays never decrease as attempts grow.
        #[test]
        fn prop_uncapped_delay_is_monotonic(base_ms in 1u64..10_000, attempt in 1u32..200) {
            let backoff = Backoff::exponential(ms(base_ms)).unwrap();
            prop_assert!(backoff.delay(attempt + 1) >= backoff.delay(attempt));
        }
    }
}
