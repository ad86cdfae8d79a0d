//! Retry policy with exponential backoff
//!
//! A [`RetryPolicy`] describes the attempt and time budget, the backoff curve
//! and the jitter strategy. [`retry_with_policy`] wraps any fallible async
//! operation with it, consulting a giveup predicate after every failure.

use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, error, warn};

/// Randomization applied to each computed backoff delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Jitter {
    /// Sleep exactly the computed delay
    None,
    /// Sleep a uniformly random duration in `[0, delay]`
    Full,
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: usize,
    /// Total time budget in milliseconds, measured from the first attempt
    pub max_elapsed_ms: u64,
    /// Delay before the second attempt in milliseconds
    pub initial_delay_ms: u64,
    /// Upper bound for a single delay in milliseconds
    pub max_delay_ms: u64,
    /// Backoff multiplier (exponential backoff)
    pub backoff_multiplier: f64,
    pub jitter: Jitter,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            max_elapsed_ms: 300_000,
            initial_delay_ms: 1000,
            max_delay_ms: 60_000,
            backoff_multiplier: 2.0,
            jitter: Jitter::Full,
        }
    }
}

impl RetryPolicy {
    /// Policy that runs the operation exactly once
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed_ms = max_elapsed.as_millis() as u64;
        self
    }

    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay_ms = initial_delay.as_millis() as u64;
        self
    }

    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_elapsed(&self) -> Duration {
        Duration::from_millis(self.max_elapsed_ms)
    }

    /// Un-jittered delay after the given failed attempt (1-based)
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as usize) as i32;
        let delay = (self.initial_delay_ms as f64) * self.backoff_multiplier.powi(exponent);
        let delay = delay.min(self.max_delay_ms as f64).max(0.0);
        Duration::from_millis(delay as u64)
    }

    fn jittered(&self, delay: Duration) -> Duration {
        match self.jitter {
            Jitter::None => delay,
            Jitter::Full => delay.mul_f64(fastrand::f64()),
        }
    }
}

/// Run `operation` until it succeeds, `giveup` accepts the error, or the
/// policy's attempt or time budget is exhausted. The last error is returned.
pub async fn retry_with_policy<F, Fut, T, E, G>(
    policy: &RetryPolicy,
    operation_name: &str,
    giveup: G,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    G: Fn(&E) -> bool,
{
    let started = Instant::now();
    let max_elapsed = policy.max_elapsed();
    let mut attempt = 0;

    loop {
        attempt += 1;

        debug!(
            operation = operation_name,
            attempt = attempt,
            max_attempts = policy.max_attempts,
            "Attempting operation"
        );

        let error = match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        operation = operation_name,
                        attempt = attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(error) => error,
        };

        if giveup(&error) {
            error!(
                operation = operation_name,
                attempt = attempt,
                error = %error,
                "Giving up on unrecoverable error"
            );
            return Err(error);
        }

        let elapsed = started.elapsed();
        if attempt >= policy.max_attempts || elapsed >= max_elapsed {
            error!(
                operation = operation_name,
                attempt = attempt,
                elapsed_ms = elapsed.as_millis() as u64,
                error = %error,
                "Operation failed after all retry attempts"
            );
            return Err(error);
        }

        let delay = policy
            .jittered(policy.backoff_delay(attempt))
            .min(max_elapsed - elapsed);

        warn!(
            operation = operation_name,
            attempt = attempt,
            error = %error,
            delay_ms = delay.as_millis() as u64,
            "Operation failed, backing off"
        );

        sleep(delay).await;
    }
}
