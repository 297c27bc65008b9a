//! Delay calculators: how the wait between attempts evolves.
//!
//! A [`DelayCalculator`] maps the previous delay to the next one. Calculators
//! are plain values; [`DelayCalculator::with`] chains two of them into a new
//! calculator without touching either input.
//!
//! ```rust
//! use steadfast::DelayCalculator;
//! use std::time::Duration;
//!
//! let calc = DelayCalculator::increasing(Duration::from_secs(1))
//!     .with(DelayCalculator::increasing(Duration::from_secs(2)));
//!
//! assert_eq!(calc.calculate(Duration::from_secs(1)), Duration::from_secs(4));
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Strategy for computing the next inter-attempt delay from the previous one.
///
/// # Ordering
///
/// `a.with(b)` applies `a` first and `b` to its result. With jitter involved
/// the order matters: `increasing.with(jittered)` jitters the already
/// incremented value, `jittered.with(increasing)` increments a jittered one.
#[derive(Clone, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum DelayCalculator {
    /// Returns the previous delay unchanged (fixed-interval retry).
    #[default]
    Constant,
    /// Adds a fixed duration each round (linear backoff).
    Increasing {
        /// Duration added to the previous delay.
        addition: Duration,
    },
    /// Adds a deviation drawn uniformly from `[-around, +around]`.
    ///
    /// The result is floored at zero.
    Jittered {
        /// Maximum deviation in either direction.
        around: Duration,
    },
    /// Applies the first calculator, then the second to its result.
    Composed(Box<DelayCalculator>, Box<DelayCalculator>),
    /// Caller-supplied function.
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(CustomDelay),
}

/// A caller-supplied delay function, shareable across threads.
#[derive(Clone)]
pub struct CustomDelay(Arc<dyn Fn(Duration) -> Duration + Send + Sync>);

impl CustomDelay {
    fn call(&self, previous: Duration) -> Duration {
        (self.0)(previous)
    }
}

impl fmt::Debug for CustomDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomDelay(..)")
    }
}

impl DelayCalculator {
    /// Keep the delay fixed.
    ///
    /// ```rust
    /// use steadfast::DelayCalculator;
    /// use std::time::Duration;
    ///
    /// let calc = DelayCalculator::constant();
    /// assert_eq!(calc.calculate(Duration::from_millis(250)), Duration::from_millis(250));
    /// ```
    pub fn constant() -> Self {
        DelayCalculator::Constant
    }

    /// Grow the delay by `addition` every round.
    ///
    /// ```rust
    /// use steadfast::DelayCalculator;
    /// use std::time::Duration;
    ///
    /// let calc = DelayCalculator::increasing(Duration::from_millis(100));
    /// assert_eq!(calc.calculate(Duration::from_millis(100)), Duration::from_millis(200));
    /// ```
    pub fn increasing(addition: Duration) -> Self {
        DelayCalculator::Increasing { addition }
    }

    /// Perturb the delay by up to `around` in either direction.
    pub fn jittered(around: Duration) -> Self {
        DelayCalculator::Jittered { around }
    }

    /// Wrap an arbitrary function as a calculator.
    ///
    /// ```rust
    /// use steadfast::DelayCalculator;
    /// use std::time::Duration;
    ///
    /// let doubling = DelayCalculator::from_fn(|d| d * 2);
    /// assert_eq!(doubling.calculate(Duration::from_secs(3)), Duration::from_secs(6));
    /// ```
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Duration) -> Duration + Send + Sync + 'static,
    {
        DelayCalculator::Custom(CustomDelay(Arc::new(f)))
    }

    /// Chain `next` after `self`: the result computes `next(self(d))`.
    pub fn with(self, next: DelayCalculator) -> Self {
        DelayCalculator::Composed(Box::new(self), Box::new(next))
    }

    /// Compute the delay that follows `previous`.
    pub fn calculate(&self, previous: Duration) -> Duration {
        match self {
            DelayCalculator::Constant => previous,
            DelayCalculator::Increasing { addition } => previous.saturating_add(*addition),
            DelayCalculator::Jittered { around } => jitter(previous, *around),
            DelayCalculator::Composed(first, second) => {
                second.calculate(first.calculate(previous))
            }
            DelayCalculator::Custom(f) => f.call(previous),
        }
    }
}

impl fmt::Debug for DelayCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelayCalculator::Constant => f.write_str("Constant"),
            DelayCalculator::Increasing { addition } => f
                .debug_struct("Increasing")
                .field("addition", addition)
                .finish(),
            DelayCalculator::Jittered { around } => {
                f.debug_struct("Jittered").field("around", around).finish()
            }
            DelayCalculator::Composed(first, second) => {
                f.debug_tuple("Composed").field(first).field(second).finish()
            }
            DelayCalculator::Custom(custom) => custom.fmt(f),
        }
    }
}

/// Shift `previous` by `around * uniform(-1, 1)`, saturating at zero.
fn jitter(previous: Duration, around: Duration) -> Duration {
    use rand::Rng;

    if around.is_zero() {
        return previous;
    }

    let factor: f64 = rand::rng().random_range(-1.0..=1.0);
    let deviation = around.as_secs_f64() * factor;
    // f64 rounding must not push the deviation past `around`
    let magnitude = Duration::try_from_secs_f64(deviation.abs())
        .unwrap_or(around)
        .min(around);

    if deviation >= 0.0 {
        previous.saturating_add(magnitude)
    } else {
        previous.saturating_sub(magnitude)
    }
}
