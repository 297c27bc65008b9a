//! # Steadfast
//!
//! > *"Try, wait, try again"*
//!
//! A small retry-with-backoff executor for fallible operations.
//!
//! ## Overview
//!
//! - [`DelayCalculator`]: how the wait between attempts evolves. Constant,
//!   increasing, jittered, custom, and any chain of those via
//!   [`DelayCalculator::with`].
//! - [`RetryConfig`] and [`Configurer`]: the attempt budget, initial delay
//!   and calculator, built from defaults plus ordered overrides.
//! - [`Retryer`]: runs an operation until it succeeds or the budget is spent,
//!   sleeping between attempts.
//!
//! ## Quick Example
//!
//! ```rust
//! use steadfast::{with_initial_delay, with_jittering_delay, with_max_retries, RetryCount, Retryer};
//! use std::time::Duration;
//!
//! let retryer = Retryer::<String>::new([
//!     with_initial_delay(Duration::from_millis(5)),
//!     with_jittering_delay(Duration::from_millis(2)),
//!     with_max_retries(RetryCount::new(3)),
//! ]);
//!
//! let mut attempt = 0;
//! let body = retryer.retry_return(|| {
//!     attempt += 1;
//!     if attempt == 1 {
//!         Err(format!("call #{}: connection reset", attempt))
//!     } else {
//!         Ok("hello".to_string())
//!     }
//! });
//!
//! assert_eq!(body, Ok("hello".to_string()));
//! ```
//!
//! ## Features
//!
//! - `tracing`: emit `debug` events for every failed attempt and for
//!   exhaustion. Error values are never logged.
//! - `async`: async entry points on the tokio timer, including
//!   [`Retryer::retry_return_until`] which stops on a shutdown future.
//! - `serde`: `Serialize`/`Deserialize` for [`RetryConfig`], [`RetryCount`]
//!   and [`DelayCalculator`] (custom calculators are not serializable).

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod count;
pub mod delay;
pub mod retry;
pub mod testing;

// Re-exports
pub use config::{
    with_delay_calculator, with_increasing_delay, with_initial_delay, with_jittering_delay,
    with_max_retries, Configurer, RetryConfig,
};
pub use count::RetryCount;
pub use delay::DelayCalculator;
pub use retry::{CancellationToken, Interrupted, RetryOutcome, Retryer};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        with_delay_calculator, with_increasing_delay, with_initial_delay, with_jittering_delay,
        with_max_retries, Configurer, RetryConfig,
    };
    pub use crate::count::RetryCount;
    pub use crate::delay::DelayCalculator;
    pub use crate::retry::{CancellationToken, Interrupted, RetryOutcome, Retryer};
}
