//! Cooperative cancellation for blocking retry loops.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Handle used to stop a cancellable retry run from another thread.
///
/// Clones share state: cancelling any clone cancels them all. A wait in
/// progress is woken immediately.
///
/// # Examples
///
/// ```rust
/// use steadfast::CancellationToken;
/// use std::time::Duration;
///
/// let token = CancellationToken::new();
/// let remote = token.clone();
///
/// std::thread::spawn(move || remote.cancel());
///
/// // Returns as soon as the other thread cancels
/// assert!(token.wait_timeout(Duration::from_secs(60)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, bool> {
        // the flag is a plain bool, a poisoned lock still holds a valid value
        self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and wake every waiter.
    pub fn cancel(&self) {
        let mut cancelled = self.inner.lock();
        *cancelled = true;
        self.inner.wake.notify_all();
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.inner.lock()
    }

    /// Block for up to `timeout`, returning early on cancellation.
    ///
    /// Returns true if the token is cancelled when the wait ends.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.inner.lock();
        let (guard, _) = self
            .inner
            .wake
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}
