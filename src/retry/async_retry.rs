//! Async entry points, sleeping on the tokio timer.
//!
//! Same state machine as the blocking entry points: same budget, same
//! delays, no sleep after the exhausting attempt. Requires a tokio runtime
//! with the time driver enabled.

use std::future::Future;
use std::pin::pin;

use futures::future::{select, Either};

use super::{AttemptState, Interrupted, RetryOutcome, Retryer};

impl<T> Retryer<T> {
    /// Async counterpart of [`run`](Self::run).
    ///
    /// ```rust
    /// use steadfast::{RetryCount, Retryer};
    /// use std::time::Duration;
    ///
    /// # tokio_test::block_on(async {
    /// let retryer = Retryer::<u32>::limited_constant_delay(Duration::from_millis(1), RetryCount::new(3));
    ///
    /// let outcome = retryer.run_async(|| async { Err::<u32, _>("down") }).await;
    /// assert_eq!(outcome.attempts(), 3);
    /// # });
    /// ```
    pub async fn run_async<E, F, Fut>(&self, op: F) -> RetryOutcome<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.drive_async(op).await
    }

    /// Async counterpart of [`retry_return`](Self::retry_return).
    pub async fn retry_return_async<E, F, Fut>(&self, op: F) -> Result<T, E>
    where
        T: Default,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.drive_async(op).await.into_result()
    }

    /// Async counterpart of [`retry`](Self::retry).
    pub async fn retry_async<E, F, Fut>(&self, op: F) -> Result<(), E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        self.drive_async(op).await.into_result()
    }

    /// Retry until success, exhaustion, or completion of `shutdown`,
    /// whichever comes first.
    ///
    /// `shutdown` is raced against both the running attempt and the wait
    /// between attempts. When it wins, the in-flight attempt is dropped and
    /// [`Interrupted::Cancelled`] is returned with the last completed
    /// attempt's error.
    ///
    /// ```rust
    /// use steadfast::{Interrupted, Retryer};
    /// use std::time::Duration;
    ///
    /// # tokio_test::block_on(async {
    /// let retryer = Retryer::<()>::unlimited_constant_delay(Duration::from_secs(60));
    /// let shutdown = tokio::time::sleep(Duration::from_millis(10));
    ///
    /// let result = retryer
    ///     .retry_return_until(|| async { Err::<(), _>("down") }, shutdown)
    ///     .await;
    ///
    /// assert_eq!(result, Err(Interrupted::cancelled(Some("down"), 1)));
    /// # });
    /// ```
    pub async fn retry_return_until<E, F, Fut, S>(
        &self,
        mut op: F,
        shutdown: S,
    ) -> Result<T, Interrupted<E>>
    where
        T: Default,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        S: Future,
    {
        let mut shutdown = pin!(shutdown);
        let mut state = AttemptState::new(self.config());
        if state.is_exhausted() {
            return Ok(T::default());
        }

        let mut last_error = None;
        loop {
            let attempt = pin!(op());
            let result = match select(attempt, shutdown.as_mut()).await {
                Either::Left((result, _)) => result,
                Either::Right(_) => {
                    return Err(Interrupted::cancelled(last_error, state.attempts()));
                }
            };

            match result {
                Ok(value) => {
                    state.succeed();
                    return Ok(value);
                }
                Err(error) => {
                    let Some(wait) = state.fail() else {
                        return Err(Interrupted::Failed(error));
                    };
                    last_error = Some(error);

                    let sleep = pin!(tokio::time::sleep(wait));
                    if let Either::Right(_) = select(sleep, shutdown.as_mut()).await {
                        return Err(Interrupted::cancelled(last_error, state.attempts()));
                    }
                }
            }
        }
    }

    async fn drive_async<U, E, F, Fut>(&self, mut op: F) -> RetryOutcome<U, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<U, E>>,
    {
        let mut state = AttemptState::new(self.config());
        if state.is_exhausted() {
            return RetryOutcome::NotAttempted;
        }

        loop {
            match op().await {
                Ok(value) => {
                    return RetryOutcome::Succeeded {
                        value,
                        attempts: state.succeed(),
                    };
                }
                Err(error) => match state.fail() {
                    Some(wait) => tokio::time::sleep(wait).await,
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
}

#[cfg(test)]
mod tests {
    use crate::config::with_max_retries;
    use crate::testing::FlakyError;
    use crate::{Interrupted, RetryCount, Retryer};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn counting_op(
        calls: &Arc<AtomicU32>,
        failures: u32,
    ) -> impl FnMut() -> std::future::Ready<Result<u32, FlakyError>> {
        let calls = Arc::clone(calls);
        move || {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if call <= failures {
                Err(FlakyError { call })
            } else {
                Ok(call)
            })
        }
    }

    #[tokio::test]
    async fn test_async_succeeds_on_third_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let retryer =
            Retryer::<u32>::limited_constant_delay(Duration::from_millis(1), RetryCount::new(5));

        let result = retryer.retry_return_async(counting_op(&calls, 2)).await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_async_exhausted_returns_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let retryer =
            Retryer::<u32>::limited_constant_delay(Duration::from_millis(1), RetryCount::new(3));

        let outcome = retryer.run_async(counting_op(&calls, u32::MAX)).await;

        assert_eq!(outcome.attempts(), 3);
        assert_eq!(outcome.error(), Some(&FlakyError { call: 3 }));
    }

    #[tokio::test]
    async fn test_async_zero_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let retryer = Retryer::<u32>::new([with_max_retries(RetryCount::ZERO)]);

        let result = retryer.retry_return_async(counting_op(&calls, 0)).await;

        assert_eq!(result, Ok(0));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_async_retry_unit() {
        let retryer =
            Retryer::<()>::limited_constant_delay(Duration::from_millis(1), RetryCount::new(2));
        let result = retryer.retry_async(|| async { Err::<(), _>("down") }).await;
        assert_eq!(result, Err("down"));
    }

    #[tokio::test]
    async fn test_async_delays_elapse() {
        let calls = Arc::new(AtomicU32::new(0));
        let retryer = Retryer::<u32>::new([
            crate::config::with_initial_delay(Duration::from_millis(10)),
            crate::config::with_increasing_delay(Duration::from_millis(10)),
        ]);
        let start = Instant::now();

        let _ = retryer.retry_return_async(counting_op(&calls, 2)).await;

        // 10ms + 20ms
        assert!(
            start.elapsed() >= Duration::from_millis(30),
            "Expected at least 30ms, got {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_wait() {
        let retryer = Retryer::<u32>::unlimited_constant_delay(Duration::from_secs(60));
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let result = retryer
            .retry_return_until(
                counting_op(&calls, u32::MAX),
                tokio::time::sleep(Duration::from_millis(20)),
            )
            .await;

        assert_eq!(
            result,
            Err(Interrupted::cancelled(Some(FlakyError { call: 1 }), 1))
        );
        assert!(start.elapsed() < Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_running_attempt() {
        let retryer = Retryer::<u32>::unlimited_every_second();

        let result = retryer
            .retry_return_until(
                || async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok::<_, FlakyError>(1)
                },
                tokio::time::sleep(Duration::from_millis(10)),
            )
            .await;

        assert_eq!(result, Err(Interrupted::cancelled(None, 0)));
    }

    #[tokio::test]
    async fn test_until_without_shutdown_behaves_like_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let retryer =
            Retryer::<u32>::limited_constant_delay(Duration::from_millis(1), RetryCount::new(4));

        let result = retryer
            .retry_return_until(counting_op(&calls, 1), std::future::pending::<()>())
            .await;
        assert_eq!(result, Ok(2));

        let exhausted = retryer
            .retry_return_until(counting_op(&calls, u32::MAX), std::future::pending::<()>())
            .await;
        assert!(matches!(exhausted, Err(Interrupted::Failed(_))));
    }
}
