//! Retry Patterns Example
//!
//! Demonstrates the blocking retry executor:
//! - Fixed-interval retry
//! - Linear backoff
//! - Linear backoff with jitter on top
//! - Exhaustion and the zero budget
//! - Cancelling a run from another thread
//!
//! Run with `cargo run --example retry_patterns --features tracing` to see
//! the engine's debug events.

use std::time::Duration;

use steadfast::prelude::*;

/// Example 1: Fixed interval
fn example_constant() {
    println!("\n=== Example 1: Constant Delay ===");

    let retryer = Retryer::<&str>::unlimited_constant_delay(Duration::from_millis(100));
    let mut attempt = 0;

    let result = retryer.retry_return(|| {
        attempt += 1;
        println!("  Attempt {}", attempt);
        if attempt < 3 {
            Err(format!("call #{}: connection refused", attempt))
        } else {
            Ok("connected")
        }
    });

    println!("Result: {:?}", result);
}

/// Example 2: Linear backoff
fn example_increasing() {
    println!("\n=== Example 2: Increasing Delay ===");

    let retryer = Retryer::<()>::new([
        with_initial_delay(Duration::from_millis(50)),
        with_increasing_delay(Duration::from_millis(50)),
        with_max_retries(RetryCount::new(4)),
    ]);

    let mut waits = Vec::new();
    let outcome = retryer.run_with_sleeper(
        || Err::<(), _>("service unavailable"),
        |d| {
            waits.push(d);
            std::thread::sleep(d);
        },
    );

    println!("Waited: {:?}", waits);
    println!("Outcome: {:?}", outcome);
}

/// Example 3: Composing strategies
fn example_composed() {
    println!("\n=== Example 3: Increasing + Jitter ===");

    let calculator = DelayCalculator::increasing(Duration::from_millis(100))
        .with(DelayCalculator::jittered(Duration::from_millis(25)));

    let mut delay = Duration::from_millis(100);
    for round in 1..=5 {
        println!("  Round {}: {:?}", round, delay);
        delay = calculator.calculate(delay);
    }
}

/// Example 4: Budget boundaries
fn example_budgets() {
    println!("\n=== Example 4: Budgets ===");

    let exhausted = Retryer::<u32>::limited_constant_delay(Duration::from_millis(10), RetryCount::new(2))
        .run(|| Err::<u32, _>("disk full"));
    println!("Two attempts: {:?}", exhausted);

    let skipped = Retryer::<u32>::new([with_max_retries(RetryCount::ZERO)])
        .retry_return(|| Err::<u32, _>("never called"));
    println!("Zero budget: {:?}", skipped);
}

/// Example 5: Cancellation
fn example_cancellation() {
    println!("\n=== Example 5: Cancellation ===");

    let retryer = Retryer::<()>::unlimited_constant_delay(Duration::from_secs(30));
    let token = CancellationToken::new();
    let remote = token.clone();

    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(200));
        println!("  Requesting cancellation");
        remote.cancel();
    });

    let result = retryer.retry_cancellable(|| Err::<(), _>("still down"), &token);
    let _ = canceller.join();

    match result {
        Err(Interrupted::Cancelled { attempts, .. }) => {
            println!("Cancelled after {} attempts", attempts)
        }
        other => println!("Unexpected: {:?}", other),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("======================================");
    println!("       Retry Patterns Example         ");
    println!("======================================");

    example_constant();
    example_increasing();
    example_composed();
    example_budgets();
    example_cancellation();

    println!("\n======================================");
    println!("           Examples Complete           ");
    println!("======================================");
}
