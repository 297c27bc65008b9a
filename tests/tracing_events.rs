//! Log output of the retry engine under the `tracing` feature
#![cfg(feature = "tracing")]

use std::time::Duration;

use steadfast::{RetryCount, Retryer};
use tracing_test::traced_test;

#[traced_test]
#[test]
fn test_failed_attempts_are_logged() {
    let retryer = Retryer::<u32>::limited_constant_delay(Duration::from_millis(1), RetryCount::new(5));
    let mut calls = 0;

    let result = retryer.retry_return(|| {
        calls += 1;
        if calls < 3 {
            Err("transient")
        } else {
            Ok(calls)
        }
    });

    assert_eq!(result, Ok(3));
    assert!(logs_contain("attempt failed, retrying"));
    assert!(logs_contain("attempt succeeded"));
}

#[traced_test]
#[test]
fn test_exhaustion_is_logged() {
    let retryer = Retryer::<()>::limited_constant_delay(Duration::from_millis(1), RetryCount::new(2));

    let _ = retryer.retry(|| Err::<(), _>("secret-token-value"));

    assert!(logs_contain("retry budget exhausted"));
}

#[traced_test]
#[test]
fn test_error_values_are_not_logged() {
    let retryer = Retryer::<()>::limited_constant_delay(Duration::from_millis(1), RetryCount::new(3));

    let _ = retryer.retry(|| Err::<(), _>("secret-token-value"));

    assert!(!logs_contain("secret-token-value"));
}
