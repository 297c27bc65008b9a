//! Async Shutdown Example
//!
//! Retries a flaky async call and stops as soon as a shutdown signal fires.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use steadfast::prelude::*;
use tokio::sync::oneshot;

#[tokio::main]
async fn main() {
    let retryer = Retryer::<String>::new([
        with_initial_delay(Duration::from_millis(100)),
        with_increasing_delay(Duration::from_millis(100)),
    ]);

    // Succeeds on the third call
    let calls = Arc::new(AtomicU32::new(0));
    let fetched = retryer
        .retry_return_async(|| {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                println!("  Fetch attempt {}", n);
                if n < 3 {
                    Err(format!("call #{}: timed out", n))
                } else {
                    Ok("payload".to_string())
                }
            }
        })
        .await;
    println!("Fetched: {:?}", fetched);

    // Never succeeds; shutdown arrives after 350ms
    let (stop, stopped) = oneshot::channel::<()>();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(350)).await;
        println!("  Shutdown requested");
        let _ = stop.send(());
    });

    let result = retryer
        .retry_return_until(
            || async { Err::<String, _>("upstream down") },
            async {
                let _ = stopped.await;
            },
        )
        .await;

    match result {
        Err(Interrupted::Cancelled {
            last_error,
            attempts,
        }) => println!("Stopped after {} attempts, last error: {:?}", attempts, last_error),
        other => println!("Unexpected: {:?}", other),
    }
}
