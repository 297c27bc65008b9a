//! Terminal states and error types for retry runs.

use std::fmt;

/// How a retry run ended.
///
/// Returned by [`Retryer::run`](crate::Retryer::run). Carries the number of
/// attempts actually made alongside the value or the final error.
///
/// # Examples
///
/// ```rust
/// use steadfast::{RetryCount, RetryOutcome, Retryer};
/// use std::time::Duration;
///
/// let retryer = Retryer::<u32>::limited_constant_delay(Duration::from_millis(1), RetryCount::new(2));
///
/// match retryer.run(|| Err::<u32, _>("always fails")) {
///     RetryOutcome::Exhausted { error, attempts } => {
///         assert_eq!(error, "always fails");
///         assert_eq!(attempts, 2);
///     }
///     other => panic!("unexpected outcome: {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T, E> {
    /// An attempt succeeded.
    Succeeded {
        /// Value returned by the successful attempt.
        value: T,
        /// Attempts made, including the successful one.
        attempts: u32,
    },
    /// Every allowed attempt failed.
    Exhausted {
        /// Error returned by the last attempt, unchanged.
        error: E,
        /// Attempts made.
        attempts: u32,
    },
    /// The budget was zero, so the operation never ran.
    NotAttempted,
}

impl<T, E> RetryOutcome<T, E> {
    /// Number of times the operation was invoked.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
            Self::NotAttempted => 0,
        }
    }

    /// Returns true if an attempt succeeded.
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Returns true if every attempt failed.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Returns true if the operation never ran.
    pub fn is_not_attempted(&self) -> bool {
        matches!(self, Self::NotAttempted)
    }

    /// Get the final error, if the run was exhausted.
    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Exhausted { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Convert to a `Result`, with `None` when nothing ran.
    pub fn into_option_result(self) -> Option<Result<T, E>> {
        match self {
            Self::Succeeded { value, .. } => Some(Ok(value)),
            Self::Exhausted { error, .. } => Some(Err(error)),
            Self::NotAttempted => None,
        }
    }

    /// Convert to a `Result`.
    ///
    /// A run that never attempted anything yields `Ok(T::default())`: there is
    /// no failure to report because nothing ran.
    pub fn into_result(self) -> Result<T, E>
    where
        T: Default,
    {
        self.into_option_result().unwrap_or_else(|| Ok(T::default()))
    }

    /// Transform the success value, keeping the metadata.
    pub fn map<U, F>(self, f: F) -> RetryOutcome<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Succeeded { value, attempts } => RetryOutcome::Succeeded {
                value: f(value),
                attempts,
            },
            Self::Exhausted { error, attempts } => RetryOutcome::Exhausted { error, attempts },
            Self::NotAttempted => RetryOutcome::NotAttempted,
        }
    }
}

/// Error returned by the cancellable entry points.
///
/// # Examples
///
/// ```rust
/// use steadfast::{CancellationToken, Interrupted, Retryer};
///
/// let token = CancellationToken::new();
/// token.cancel();
///
/// let retryer = Retryer::<()>::unlimited_every_second();
/// let result = retryer.retry_cancellable(|| Err::<(), _>("unreachable"), &token);
///
/// assert!(matches!(result, Err(Interrupted::Cancelled { attempts: 0, .. })));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interrupted<E> {
    /// Cancellation was requested before the run finished.
    Cancelled {
        /// Error of the last completed attempt, if any ran.
        last_error: Option<E>,
        /// Attempts completed before cancellation.
        attempts: u32,
    },
    /// Every allowed attempt failed; holds the last error.
    Failed(E),
}

impl<E> Interrupted<E> {
    /// Create a cancellation error.
    pub fn cancelled(last_error: Option<E>, attempts: u32) -> Self {
        Self::Cancelled {
            last_error,
            attempts,
        }
    }

    /// Returns true if the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns true if the run was exhausted.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Get the most recent operation error, if one was observed.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Cancelled { last_error, .. } => last_error,
            Self::Failed(e) => Some(e),
        }
    }
}

impl<E: fmt::Display> fmt::Display for Interrupted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled {
                last_error: Some(e),
                attempts,
            } => write!(f, "retry cancelled after {} attempts: {}", attempts, e),
            Self::Cancelled {
                last_error: None,
                attempts,
            } => write!(f, "retry cancelled after {} attempts", attempts),
            Self::Failed(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for Interrupted<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cancelled { last_error, .. } => {
                last_error.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
            }
            Self::Failed(e) => Some(e),
        }
    }
}
