//! Integration tests for the public retry API
//!
//! Exercises the scenarios retry callers rely on: success after transient
//! failures, exhaustion with the last error, delay progression, and the zero
//! budget boundary.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use steadfast::prelude::*;
use steadfast::testing::{FlakyError, FlakyOperation, RecordingSleeper};
use steadfast::{assert_exhausted, assert_succeeded};

const STEP: Duration = Duration::from_millis(50);

fn assert_finishes_within<F>(limit: Duration, work: F)
where
    F: FnOnce() + Send + 'static,
{
    let (done, finished) = mpsc::channel();
    std::thread::spawn(move || {
        work();
        let _ = done.send(());
    });

    finished
        .recv_timeout(limit)
        .expect("retry took too long to finish");
}

#[test]
fn test_unlimited_every_second_builds() {
    let retryer = Retryer::<()>::unlimited_every_second();
    assert!(retryer.config().max_retries().is_unlimited());
    assert_eq!(retryer.config().initial_delay(), Duration::from_secs(1));
}

#[test]
fn test_every_second_retries_within_two_seconds() {
    assert_finishes_within(Duration::from_secs(2), || {
        let retryer = Retryer::<()>::unlimited_every_second();
        let mut flaky = FlakyOperation::new(1, ());
        assert_eq!(retryer.retry(|| flaky.call()), Ok(()));
    });
}

#[test]
fn test_constant_delay_returns_ok_after_failure() {
    let retryer = Retryer::<()>::unlimited_constant_delay(STEP);
    let mut flaky = FlakyOperation::new(1, ());

    assert_eq!(retryer.retry(|| flaky.call()), Ok(()));
    assert_eq!(flaky.calls(), 2);
}

#[test]
fn test_constant_delay_returns_value() {
    let retryer = Retryer::<i32>::unlimited_constant_delay(STEP);
    let mut flaky = FlakyOperation::new(1, 10);

    assert_eq!(retryer.retry_return(|| flaky.call()), Ok(10));
}

#[test]
fn test_fails_once_waits_one_delay() {
    let retryer = Retryer::<i32>::unlimited_constant_delay(STEP);
    let mut flaky = FlakyOperation::new(1, 10);
    let start = Instant::now();

    let _ = retryer.retry_return(|| flaky.call());
    let elapsed = start.elapsed();

    assert!(elapsed >= STEP, "Expected at least {:?}, got {:?}", STEP, elapsed);
    assert!(
        elapsed < STEP * 10,
        "Expected roughly one delay, got {:?}",
        elapsed
    );
}

#[test]
fn test_limited_returns_last_attempt_error() {
    let retryer = Retryer::<()>::limited_constant_delay(STEP, RetryCount::new(2));
    let mut flaky = FlakyOperation::new(3, ());

    let err = retryer.retry(|| flaky.call()).unwrap_err();

    assert!(err.to_string().starts_with("call #2"), "{}", err);
    assert_eq!(flaky.calls(), 2);
}

#[test]
fn test_limited_exhaustion_skips_trailing_sleep() {
    let retryer = Retryer::<()>::limited_constant_delay(STEP, RetryCount::new(2));
    let start = Instant::now();

    let _ = retryer.retry(|| Err::<(), _>("down"));
    let elapsed = start.elapsed();

    // one sleep between the two attempts, none after the last
    assert!(elapsed >= STEP);
    assert!(elapsed < STEP * 2, "got {:?}", elapsed);
}

#[test]
fn test_builder_returns_last_error() {
    let retryer = Retryer::<()>::new([
        with_initial_delay(Duration::from_millis(5)),
        with_max_retries(RetryCount::new(2)),
    ]);
    let mut flaky = FlakyOperation::new(3, ());

    assert_eq!(
        retryer.retry(|| flaky.call()),
        Err(FlakyError { call: 2 })
    );
}

#[test]
fn test_error_passes_through_unchanged() {
    #[derive(Debug, PartialEq)]
    struct DbError {
        code: u16,
        detail: &'static str,
    }

    let retryer = Retryer::<()>::limited_constant_delay(Duration::ZERO, RetryCount::new(1));
    let result = retryer.retry(|| {
        Err(DbError {
            code: 40001,
            detail: "serialization failure",
        })
    });

    assert_eq!(
        result,
        Err(DbError {
            code: 40001,
            detail: "serialization failure"
        })
    );
}

#[test]
fn test_increasing_backoff_delays() {
    let retryer = Retryer::<()>::new([
        with_initial_delay(Duration::from_secs(1)),
        with_increasing_delay(Duration::from_secs(1)),
    ]);
    let mut flaky = FlakyOperation::new(2, ());
    let mut sleeper = RecordingSleeper::new();

    let outcome = retryer.run_with_sleeper(|| flaky.call(), |d| sleeper.sleep(d));

    assert_succeeded!(outcome, ());
    assert_eq!(
        sleeper.delays(),
        &[Duration::from_secs(1), Duration::from_secs(2)]
    );
}

#[test]
fn test_jittered_backoff_delays_stay_in_range() {
    let retryer = Retryer::<()>::new([
        with_initial_delay(Duration::from_secs(10)),
        with_jittering_delay(Duration::from_secs(1)),
        with_max_retries(RetryCount::new(4)),
    ]);
    let mut sleeper = RecordingSleeper::new();

    let outcome = retryer.run_with_sleeper(|| Err::<(), _>("down"), |d| sleeper.sleep(d));

    assert_exhausted!(outcome, 4);
    let delays = sleeper.delays();
    assert_eq!(delays.len(), 3);
    // the first wait is the initial delay, each later one drifts by at most 1s
    assert_eq!(delays[0], Duration::from_secs(10));
    for pair in delays.windows(2) {
        let drift = if pair[1] > pair[0] {
            pair[1] - pair[0]
        } else {
            pair[0] - pair[1]
        };
        assert!(drift <= Duration::from_secs(1), "{:?}", pair);
    }
}

#[test]
fn test_increasing_with_jitter_composition() {
    let calculator = DelayCalculator::increasing(Duration::from_secs(1))
        .with(DelayCalculator::jittered(Duration::from_millis(100)));
    let retryer = Retryer::<()>::new([
        with_initial_delay(Duration::from_secs(1)),
        with_delay_calculator(calculator),
        with_max_retries(RetryCount::new(3)),
    ]);
    let mut sleeper = RecordingSleeper::new();

    let _ = retryer.run_with_sleeper(|| Err::<(), _>("down"), |d| sleeper.sleep(d));

    let second = sleeper.delays()[1];
    assert!(second >= Duration::from_millis(1900), "{:?}", second);
    assert!(second <= Duration::from_millis(2100), "{:?}", second);
}

#[test]
fn test_zero_budget_boundary() {
    let retryer = Retryer::<Vec<u8>>::new([with_max_retries(RetryCount::ZERO)]);
    let mut calls = 0;

    let result = retryer.retry_return(|| {
        calls += 1;
        Err::<Vec<u8>, _>("never")
    });

    assert_eq!(result, Ok(Vec::new()));
    assert_eq!(calls, 0);
}

#[test]
fn test_later_configurers_win() {
    let retryer = Retryer::<()>::new([
        with_max_retries(RetryCount::new(10)),
        with_initial_delay(Duration::from_secs(9)),
        with_max_retries(RetryCount::new(1)),
        with_initial_delay(Duration::ZERO),
    ]);

    assert_eq!(retryer.config().max_retries(), RetryCount::new(1));
    assert_eq!(retryer.config().initial_delay(), Duration::ZERO);
}

#[test]
fn test_cancellation_from_another_thread() {
    let retryer = Retryer::<()>::unlimited_constant_delay(Duration::from_secs(60));
    let token = CancellationToken::new();
    let remote = token.clone();

    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(30));
        remote.cancel();
    });

    let mut flaky = FlakyOperation::new(u32::MAX, ());
    let result = retryer.retry_cancellable(|| flaky.call(), &token);
    handle.join().unwrap();

    match result {
        Err(Interrupted::Cancelled {
            last_error,
            attempts,
        }) => {
            assert_eq!(attempts, 1);
            assert_eq!(last_error, Some(FlakyError { call: 1 }));
        }
        other => panic!("Expected cancellation, got {:?}", other),
    }
}
