//! The retry executor.
//!
//! A [`Retryer`] holds an immutable [`RetryConfig`] and drives a fallible
//! operation until it succeeds or the attempt budget runs out:
//!
//! 1. With no attempts left, stop.
//! 2. Invoke the operation. On success, return its value.
//! 3. On failure, consume one attempt. If none remain, return the error.
//!    Otherwise sleep for the current delay, advance the delay through the
//!    calculator, and go back to 2.
//!
//! There is no sleep after the attempt that exhausts the budget, so `N`
//! failed attempts sleep `N - 1` times.
//!
//! # Quick Start
//!
//! ```rust
//! use steadfast::{with_increasing_delay, with_initial_delay, with_max_retries, RetryCount, Retryer};
//! use std::time::Duration;
//!
//! let retryer = Retryer::<u32>::new([
//!     with_initial_delay(Duration::from_millis(1)),
//!     with_increasing_delay(Duration::from_millis(1)),
//!     with_max_retries(RetryCount::new(5)),
//! ]);
//!
//! let mut calls = 0;
//! let value = retryer.retry_return(|| {
//!     calls += 1;
//!     if calls < 3 { Err("not yet") } else { Ok(calls) }
//! });
//!
//! assert_eq!(value, Ok(3));
//! ```
//!
//! # Zero budget
//!
//! A budget of [`RetryCount::ZERO`] never invokes the operation.
//! [`Retryer::run`] reports this as [`RetryOutcome::NotAttempted`];
//! [`Retryer::retry_return`] turns it into `Ok(T::default())` and
//! [`Retryer::retry`] into `Ok(())`.
//!
//! # Cancellation
//!
//! [`Retryer::retry`] and [`Retryer::retry_return`] block in
//! `std::thread::sleep` and cannot be interrupted. Use
//! [`Retryer::retry_return_cancellable`] with a [`CancellationToken`] when
//! another thread needs to stop the run, or the async entry points (feature
//! `async`) with a shutdown future.

#[cfg(feature = "async")]
mod async_retry;
mod cancel;
mod error;

pub use cancel::CancellationToken;
pub use error::{Interrupted, RetryOutcome};

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use crate::config::{Configurer, RetryConfig};
use crate::count::RetryCount;
use crate::delay::DelayCalculator;

/// Executor that retries operations producing a `T`.
///
/// Only configuration is stored; every call keeps its own counter and delay,
/// so one retryer can be reused and shared between threads.
///
/// # Examples
///
/// ```rust
/// use steadfast::{RetryCount, Retryer};
/// use std::time::Duration;
///
/// let retryer = Retryer::<()>::limited_constant_delay(Duration::from_millis(1), RetryCount::new(2));
///
/// let mut calls = 0;
/// let result = retryer.retry(|| {
///     calls += 1;
///     Err(format!("call #{}", calls))
/// });
///
/// assert_eq!(result, Err("call #2".to_string()));
/// ```
pub struct Retryer<T> {
    config: RetryConfig,
    _result: PhantomData<fn() -> T>,
}

impl<T> Retryer<T> {
    /// Build a retryer from the defaults plus `configurers`, applied in order.
    pub fn new<I>(configurers: I) -> Self
    where
        I: IntoIterator<Item = Configurer>,
    {
        Self::from_config(RetryConfig::default().apply(configurers))
    }

    /// Build a retryer from a finished configuration.
    pub fn from_config(config: RetryConfig) -> Self {
        Self {
            config,
            _result: PhantomData,
        }
    }

    /// Unlimited attempts, one second apart.
    pub fn unlimited_every_second() -> Self {
        Self::from_config(RetryConfig::default())
    }

    /// Unlimited attempts with a fixed `delay` between them.
    pub fn unlimited_constant_delay(delay: Duration) -> Self {
        Self::from_config(RetryConfig::default().with_initial_delay(delay))
    }

    /// At most `max_retries` attempts with a fixed `delay` between them.
    pub fn limited_constant_delay(delay: Duration, max_retries: RetryCount) -> Self {
        Self::from_config(
            RetryConfig::default()
                .with_initial_delay(delay)
                .with_max_retries(max_retries),
        )
    }

    /// Get the configuration this retryer was built from.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `op` until it succeeds or the budget is spent, reporting how the
    /// run ended.
    pub fn run<E, F>(&self, op: F) -> RetryOutcome<T, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        self.drive(op, std::thread::sleep)
    }

    /// Like [`run`](Self::run), but waits by calling `sleeper` instead of
    /// blocking the thread.
    ///
    /// ```rust
    /// use steadfast::{RetryCount, Retryer};
    /// use std::time::Duration;
    ///
    /// let retryer = Retryer::<()>::limited_constant_delay(Duration::from_secs(3), RetryCount::new(3));
    /// let mut waits = Vec::new();
    ///
    /// let outcome = retryer.run_with_sleeper(|| Err::<(), _>("down"), |d| waits.push(d));
    ///
    /// assert_eq!(outcome.attempts(), 3);
    /// assert_eq!(waits, vec![Duration::from_secs(3); 2]);
    /// ```
    pub fn run_with_sleeper<E, F, S>(&self, op: F, sleeper: S) -> RetryOutcome<T, E>
    where
        F: FnMut() -> Result<T, E>,
        S: FnMut(Duration),
    {
        self.drive(op, sleeper)
    }

    /// Retry `op` and return the value of the first successful attempt, or
    /// the error of the last one.
    ///
    /// With a zero budget the operation never runs and `T::default()` is
    /// returned.
    pub fn retry_return<E, F>(&self, op: F) -> Result<T, E>
    where
        T: Default,
        F: FnMut() -> Result<T, E>,
    {
        self.run(op).into_result()
    }

    /// Retry `op` for its side effects.
    ///
    /// Shares the engine with [`retry_return`](Self::retry_return), using `()`
    /// as the value.
    pub fn retry<E, F>(&self, op: F) -> Result<(), E>
    where
        F: FnMut() -> Result<(), E>,
    {
        self.drive(op, std::thread::sleep).into_result()
    }

    /// Like [`retry_return`](Self::retry_return), but stops when `token` is
    /// cancelled.
    ///
    /// Cancellation is checked before every attempt and interrupts a wait in
    /// progress. An attempt already running is not interrupted.
    pub fn retry_return_cancellable<E, F>(
        &self,
        op: F,
        token: &CancellationToken,
    ) -> Result<T, Interrupted<E>>
    where
        T: Default,
        F: FnMut() -> Result<T, E>,
    {
        self.drive_cancellable(op, token)
    }

    /// Like [`retry`](Self::retry), but stops when `token` is cancelled.
    pub fn retry_cancellable<E, F>(
        &self,
        op: F,
        token: &CancellationToken,
    ) -> Result<(), Interrupted<E>>
    where
        F: FnMut() -> Result<(), E>,
    {
        self.drive_cancellable(op, token)
    }

    fn drive<U, E, F, S>(&self, mut op: F, mut sleep: S) -> RetryOutcome<U, E>
    where
        F: FnMut() -> Result<U, E>,
        S: FnMut(Duration),
    {
        let mut state = AttemptState::new(&self.config);
        if state.is_exhausted() {
            return RetryOutcome::NotAttempted;
        }

        loop {
            match op() {
                Ok(value) => {
                    return RetryOutcome::Succeeded {
                        value,
                        attempts: state.succeed(),
                    };
                }
                Err(error) => match state.fail() {
                    Some(wait) => sleep(wait),
                    None => {
                        return RetryOutcome::Exhausted {
                            error,
                            attempts: state.attempts(),
                        };
                    }
                },
            }
        }
    }

    fn drive_cancellable<U, E, F>(
        &self,
        mut op: F,
        token: &CancellationToken,
    ) -> Result<U, Interrupted<E>>
    where
        U: Default,
        F: FnMut() -> Result<U, E>,
    {
        let mut state = AttemptState::new(&self.config);
        if state.is_exhausted() {
            return Ok(U::default());
        }

        let mut last_error = None;
        loop {
            if token.is_cancelled() {
                return Err(Interrupted::cancelled(last_error, state.attempts()));
            }

            match op() {
                Ok(value) => {
                    state.succeed();
                    return Ok(value);
                }
                Err(error) => {
                    let Some(wait) = state.fail() else {
                        return Err(Interrupted::Failed(error));
                    };
                    last_error = Some(error);
                    token.wait_timeout(wait);
                }
            }
        }
    }
}

impl<T> Default for Retryer<T> {
    fn default() -> Self {
        Self::unlimited_every_second()
    }
}

impl<T> Clone for Retryer<T> {
    fn clone(&self) -> Self {
        Self::from_config(self.config.clone())
    }
}

impl<T> fmt::Debug for Retryer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retryer")
            .field("config", &self.config)
            .finish()
    }
}

impl<T> From<RetryConfig> for Retryer<T> {
    fn from(config: RetryConfig) -> Self {
        Self::from_config(config)
    }
}

/// Per-call progress through the attempt budget.
#[derive(Debug)]
pub(crate) struct AttemptState<'a> {
    remaining: RetryCount,
    delay: Duration,
    attempts: u32,
    calculator: &'a DelayCalculator,
}

impl<'a> AttemptState<'a> {
    pub(crate) fn new(config: &'a RetryConfig) -> Self {
        Self {
            remaining: config.max_retries(),
            delay: config.initial_delay(),
            attempts: 0,
            calculator: config.delay_calculator(),
        }
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Attempts completed so far.
    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record a successful attempt, returning the total attempt count.
    pub(crate) fn succeed(&mut self) -> u32 {
        self.attempts = self.attempts.saturating_add(1);
        #[cfg(feature = "tracing")]
        tracing::debug!(attempts = self.attempts, "attempt succeeded");
        self.attempts
    }

    /// Record a failed attempt.
    ///
    /// Returns how long to wait before the next attempt, or `None` once the
    /// budget is spent.
    pub(crate) fn fail(&mut self) -> Option<Duration> {
        self.attempts = self.attempts.saturating_add(1);
        self.remaining = self.remaining.decrement();

        if self.remaining.is_zero() {
            #[cfg(feature = "tracing")]
            tracing::debug!(attempts = self.attempts, "retry budget exhausted");
            return None;
        }

        let wait = self.delay;
        self.delay = self.calculator.calculate(wait);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempt = self.attempts,
            remaining = %self.remaining,
            wait = ?wait,
            "attempt failed, retrying"
        );

        Some(wait)
    }
}
