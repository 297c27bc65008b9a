//! Attempt budget for a retryer.

use std::fmt;

/// Number of attempts a retryer may make.
///
/// Backed by a `u16`. The maximum value, [`RetryCount::UNLIMITED`], is reserved
/// as a sentinel: a budget of `UNLIMITED` is never decremented, so the retryer
/// keeps going until the operation succeeds.
///
/// # Examples
///
/// ```rust
/// use steadfast::RetryCount;
///
/// let budget = RetryCount::new(3);
/// assert_eq!(budget.get(), 3);
/// assert!(!budget.is_unlimited());
///
/// assert!(RetryCount::UNLIMITED.is_unlimited());
/// assert_eq!(RetryCount::UNLIMITED.decrement(), RetryCount::UNLIMITED);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct RetryCount(u16);

impl RetryCount {
    /// Sentinel budget meaning "retry until success".
    pub const UNLIMITED: RetryCount = RetryCount(u16::MAX);

    /// A budget of zero attempts. The operation is never invoked.
    pub const ZERO: RetryCount = RetryCount(0);

    /// Create a budget of `n` attempts.
    ///
    /// `u16::MAX` is the same as [`RetryCount::UNLIMITED`].
    pub const fn new(n: u16) -> Self {
        RetryCount(n)
    }

    /// Raw counter value.
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Returns true for the unlimited sentinel.
    pub const fn is_unlimited(self) -> bool {
        self.0 == u16::MAX
    }

    /// Returns true when no attempts remain.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Consume one attempt. Unlimited and zero budgets are left unchanged.
    pub const fn decrement(self) -> Self {
        if self.is_unlimited() || self.is_zero() {
            self
        } else {
            RetryCount(self.0 - 1)
        }
    }
}

impl Default for RetryCount {
    fn default() -> Self {
        Self::UNLIMITED
    }
}

impl From<u16> for RetryCount {
    fn from(n: u16) -> Self {
        RetryCount(n)
    }
}

impl fmt::Display for RetryCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unlimited() {
            write!(f, "unlimited")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
