//! Time abstraction for testability
//!
//! The retry loop only needs two things from time: a monotonic "now" for the
//! timeout handler and a way to wait out a backoff delay. Both go through the
//! [`Clock`] trait so tests can swap in a [`MockClock`] and run without real
//! sleeps.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use retrier::{Clock, MockClock};
//!
//! let mock = MockClock::new();
//! let start = mock.now();
//! mock.sleep(Duration::from_secs(5));
//! assert_eq!(mock.now().duration_since(start), Duration::from_secs(5));
//! assert_eq!(mock.sleeps(), vec![Duration::from_secs(5)]);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Trait for time operations used by the retrier
pub trait Clock: Send + Sync + fmt::Debug {
    /// Get current instant (monotonic time)
    fn now(&self) -> Instant;

    /// Block the calling thread for `duration`
    fn sleep(&self, duration: Duration);
}

/// Real system clock implementation
///
/// Sleeping suspends the calling thread with [`std::thread::sleep`]; it never
/// busy-waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Mock clock for deterministic testing
///
/// Virtual time only moves when [`MockClock::advance`] or [`Clock::sleep`] is
/// called. Every sleep is recorded so tests can assert the exact backoff
/// schedule, unless the clock was created with
/// [`MockClock::without_recording`]. Clones share the same timeline.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    record_sleeps: bool,
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

impl MockClock {
    /// Create a new mock clock anchored at the current real instant
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            record_sleeps: true,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Create a mock clock that advances on sleep but keeps no history
    ///
    /// Memory stays constant however many sleeps happen, which suits
    /// long-running loops such as benchmarks.
    pub fn without_recording() -> Self {
        Self { record_sleeps: false, ..Self::new() }
    }

    /// Advance the mock clock without recording a sleep
    pub fn advance(&self, duration: Duration) {
        let mut state = self.state.lock();
        state.elapsed = state.elapsed.saturating_add(duration);
    }

    /// Total virtual time elapsed since creation
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }

    /// Every duration passed to [`Clock::sleep`], in call order
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().sleeps.clone()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.state.lock().elapsed
    }

    fn sleep(&self, duration: Duration) {
        let mut state = self.state.lock();
        state.elapsed = state.elapsed.saturating_add(duration);
        if self.record_sleeps {
            state.sleeps.push(duration);
        }
    }
}
