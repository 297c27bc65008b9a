//! Testing utilities for code that retries.
//!
//! Helpers for exercising retry behavior without real failures or real
//! clocks: an operation that fails a fixed number of times, a sleeper that
//! records requested waits, and assertion macros for [`RetryOutcome`].
//!
//! # Examples
//!
//! ```rust
//! use steadfast::testing::{FlakyOperation, RecordingSleeper};
//! use steadfast::{assert_succeeded, RetryCount, Retryer};
//! use std::time::Duration;
//!
//! let retryer = Retryer::<u32>::limited_constant_delay(Duration::from_secs(10), RetryCount::new(5));
//! let mut flaky = FlakyOperation::new(2, 42);
//! let mut sleeper = RecordingSleeper::new();
//!
//! let outcome = retryer.run_with_sleeper(|| flaky.call(), |d| sleeper.sleep(d));
//!
//! assert_succeeded!(outcome, 42);
//! assert_eq!(sleeper.total(), Duration::from_secs(20));
//! ```
//!
//! [`RetryOutcome`]: crate::RetryOutcome

use std::fmt;
use std::time::Duration;

/// An operation that fails a fixed number of times, then succeeds.
///
/// Errors carry the 1-indexed call number, so tests can check which attempt
/// an error came from.
#[derive(Debug, Clone)]
pub struct FlakyOperation<T> {
    failures: u32,
    calls: u32,
    value: T,
}

impl<T: Clone> FlakyOperation<T> {
    /// Fail the first `failures` calls, then return `value`.
    ///
    /// Pass `u32::MAX` for an operation that never succeeds.
    pub fn new(failures: u32, value: T) -> Self {
        Self {
            failures,
            calls: 0,
            value,
        }
    }

    /// Invoke the operation once.
    pub fn call(&mut self) -> Result<T, FlakyError> {
        self.calls = self.calls.saturating_add(1);
        if self.calls <= self.failures {
            Err(FlakyError { call: self.calls })
        } else {
            Ok(self.value.clone())
        }
    }

    /// Number of calls so far.
    pub fn calls(&self) -> u32 {
        self.calls
    }
}

/// Error produced by [`FlakyOperation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlakyError {
    /// Which call failed (1-indexed).
    pub call: u32,
}

impl fmt::Display for FlakyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call #{}: flaky failure", self.call)
    }
}

impl std::error::Error for FlakyError {}

/// Sleeper that records waits instead of blocking.
///
/// Pass `|d| sleeper.sleep(d)` to
/// [`Retryer::run_with_sleeper`](crate::Retryer::run_with_sleeper).
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    delays: Vec<Duration>,
}

impl RecordingSleeper {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a requested wait.
    pub fn sleep(&mut self, delay: Duration) {
        self.delays.push(delay);
    }

    /// Every requested wait, in order.
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Number of waits requested.
    pub fn count(&self) -> usize {
        self.delays.len()
    }

    /// Sum of all requested waits.
    pub fn total(&self) -> Duration {
        self.delays.iter().sum()
    }
}

/// Assert that a retry run succeeded, optionally with a specific value.
///
/// # Example
///
/// ```rust
/// use steadfast::{assert_succeeded, RetryOutcome};
///
/// let outcome: RetryOutcome<i32, String> = RetryOutcome::Succeeded { value: 1, attempts: 1 };
/// assert_succeeded!(outcome.clone());
/// assert_succeeded!(outcome, 1);
/// ```
#[macro_export]
macro_rules! assert_succeeded {
    ($outcome:expr) => {
        match $outcome {
            $crate::RetryOutcome::Succeeded { .. } => {}
            other => {
                panic!("Expected Succeeded, got {:?}", other);
            }
        }
    };
    ($outcome:expr, $expected:expr) => {
        match $outcome {
            $crate::RetryOutcome::Succeeded { value, .. } => {
                assert_eq!(value, $expected);
            }
            other => {
                panic!("Expected Succeeded with {:?}, got {:?}", $expected, other);
            }
        }
    };
}

/// Assert that a retry run was exhausted, optionally after a specific number
/// of attempts.
///
/// # Example
///
/// ```rust
/// use steadfast::{assert_exhausted, RetryOutcome};
///
/// let outcome: RetryOutcome<i32, &str> = RetryOutcome::Exhausted { error: "boom", attempts: 3 };
/// assert_exhausted!(outcome.clone());
/// assert_exhausted!(outcome, 3);
/// ```
#[macro_export]
macro_rules! assert_exhausted {
    ($outcome:expr) => {
        match $outcome {
            $crate::RetryOutcome::Exhausted { .. } => {}
            other => {
                panic!("Expected Exhausted, got {:?}", other);
            }
        }
    };
    ($outcome:expr, $attempts:expr) => {
        match $outcome {
            $crate::RetryOutcome::Exhausted { attempts, .. } => {
                assert_eq!(attempts, $attempts);
            }
            other => {
                panic!(
                    "Expected Exhausted after {} attempts, got {:?}",
                    $attempts, other
                );
            }
        }
    };
}
