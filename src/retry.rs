//! Caller-side retry with exponential backoff
//!
//! The HTTP client never retries. Fetch units wrap their requests in [`with_retry`],
//! which is a pass-through under the default [`RetryConfig`] (`max_attempts = 0`).
//!
//! # Example
//!
//! ```no_run
//! use fillbass::retry::{IsRetryable, with_retry};
//! use fillbass::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{:?}", self)
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() -> Result<(), MyError> {
//! let config = RetryConfig { max_attempts: 3, ..Default::default() };
//! let result = with_retry(&config, || async {
//!     Ok::<_, MyError>(())
//! }).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Network { source, .. } => source.is_timeout() || source.is_connect(),
            // Server-side trouble and throttling
            Error::Http { status, .. } => *status >= 500 || *status == 429,
            Error::Parse(_)
            | Error::Filesystem { .. }
            | Error::InvalidUrl { .. }
            | Error::InvalidDateRange { .. }
            | Error::Config { .. }
            | Error::Serialization(_)
            | Error::Cancelled
            | Error::ShuttingDown => false,
        }
    }
}

/// Execute an async operation, retrying retryable errors with exponential backoff
///
/// Returns the successful result or the last error once `config.max_attempts`
/// retries are used up.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "Request succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                attempt += 1;

                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis(),
                    "Request failed, retrying"
                );

                let jittered_delay = if config.jitter {
                    add_jitter(delay)
                } else {
                    delay
                };
                tokio::time::sleep(jittered_delay).await;

                let next_delay =
                    Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier);
                delay = next_delay.min(config.max_delay);
            }
            Err(e) => {
                if attempt > 0 {
                    tracing::debug!(
                        error = %e,
                        attempts = attempt + 1,
                        "Request failed after all retry attempts"
                    );
                }
                return Err(e);
            }
        }
    }
}

/// Stretch `delay` by a uniform factor in [1, 2]
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}
