//! Retry configuration and the configurers that override it.
//!
//! A [`RetryConfig`] starts from defaults (unlimited attempts, one second
//! initial delay, constant calculator). Overrides are applied in order, and a
//! later override of the same field replaces an earlier one.
//!
//! ```rust
//! use steadfast::{Configurer, RetryConfig, RetryCount};
//! use std::time::Duration;
//!
//! let config = RetryConfig::default().apply([
//!     Configurer::MaxRetries(RetryCount::new(5)),
//!     Configurer::InitialDelay(Duration::from_millis(100)),
//!     Configurer::InitialDelay(Duration::from_millis(250)),
//! ]);
//!
//! assert_eq!(config.max_retries(), RetryCount::new(5));
//! assert_eq!(config.initial_delay(), Duration::from_millis(250));
//! ```

use std::time::Duration;

use crate::count::RetryCount;
use crate::delay::DelayCalculator;

/// Initial delay used when none is configured.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// The knobs a [`Retryer`](crate::Retryer) needs.
///
/// Plain data: build it, then hand it to
/// [`Retryer::from_config`](crate::Retryer::from_config).
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct RetryConfig {
    max_retries: RetryCount,
    initial_delay: Duration,
    delay_calculator: DelayCalculator,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: RetryCount::UNLIMITED,
            initial_delay: DEFAULT_INITIAL_DELAY,
            delay_calculator: DelayCalculator::Constant,
        }
    }
}

impl RetryConfig {
    /// Set the delay before the second attempt.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the attempt budget.
    ///
    /// A budget of zero means the operation is never invoked.
    pub fn with_max_retries(mut self, max_retries: RetryCount) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Use linear backoff, replacing the current calculator.
    pub fn with_increasing_delay(self, addition: Duration) -> Self {
        self.with_delay_calculator(DelayCalculator::increasing(addition))
    }

    /// Use jittered delays, replacing the current calculator.
    pub fn with_jittering_delay(self, around: Duration) -> Self {
        self.with_delay_calculator(DelayCalculator::jittered(around))
    }

    /// Use an explicit calculator, e.g. a composed one.
    ///
    /// ```rust
    /// use steadfast::{DelayCalculator, RetryConfig};
    /// use std::time::Duration;
    ///
    /// // Linear backoff with jitter on top
    /// let config = RetryConfig::default().with_delay_calculator(
    ///     DelayCalculator::increasing(Duration::from_secs(1))
    ///         .with(DelayCalculator::jittered(Duration::from_millis(200))),
    /// );
    /// ```
    pub fn with_delay_calculator(mut self, calculator: DelayCalculator) -> Self {
        self.delay_calculator = calculator;
        self
    }

    /// Apply configurers left to right.
    pub fn apply<I>(self, configurers: I) -> Self
    where
        I: IntoIterator<Item = Configurer>,
    {
        configurers
            .into_iter()
            .fold(self, |config, configurer| configurer.apply(config))
    }

    /// Get the attempt budget.
    pub fn max_retries(&self) -> RetryCount {
        self.max_retries
    }

    /// Get the initial delay.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Get the delay calculator.
    pub fn delay_calculator(&self) -> &DelayCalculator {
        &self.delay_calculator
    }
}

/// A single named override of one [`RetryConfig`] field.
#[derive(Debug, Clone)]
pub enum Configurer {
    /// Overrides the initial delay.
    InitialDelay(Duration),
    /// Overrides the attempt budget.
    MaxRetries(RetryCount),
    /// Replaces the calculator with [`DelayCalculator::Increasing`].
    IncreasingDelay(Duration),
    /// Replaces the calculator with [`DelayCalculator::Jittered`].
    JitteringDelay(Duration),
    /// Replaces the calculator with the given one.
    DelayCalculator(DelayCalculator),
}

impl Configurer {
    /// Apply this override to `config`.
    pub fn apply(self, config: RetryConfig) -> RetryConfig {
        match self {
            Configurer::InitialDelay(delay) => config.with_initial_delay(delay),
            Configurer::MaxRetries(count) => config.with_max_retries(count),
            Configurer::IncreasingDelay(addition) => config.with_increasing_delay(addition),
            Configurer::JitteringDelay(around) => config.with_jittering_delay(around),
            Configurer::DelayCalculator(calculator) => config.with_delay_calculator(calculator),
        }
    }
}

/// Configurer overriding the initial delay.
pub fn with_initial_delay(delay: Duration) -> Configurer {
    Configurer::InitialDelay(delay)
}

/// Configurer overriding the attempt budget.
pub fn with_max_retries(max_retries: RetryCount) -> Configurer {
    Configurer::MaxRetries(max_retries)
}

/// Configurer selecting linear backoff.
pub fn with_increasing_delay(addition: Duration) -> Configurer {
    Configurer::IncreasingDelay(addition)
}

/// Configurer selecting jittered delays.
pub fn with_jittering_delay(around: Duration) -> Configurer {
    Configurer::JitteringDelay(around)
}

/// Configurer installing an explicit calculator.
pub fn with_delay_calculator(calculator: DelayCalculator) -> Configurer {
    Configurer::DelayCalculator(calculator)
}
