//! # Retry Handler
//!
//! Bounded exponential-backoff retries for transient dependency failures. The
//! caller decides which errors are worth retrying through a predicate; anything
//! it rejects is returned on the spot.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Growth factor applied per attempt
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

/// Runs operations with bounded exponential-backoff retries
#[derive(Debug, Clone, Default)]
pub struct RetryHandler {
    config: RetryConfig,
}

impl RetryHandler {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Delay after the failed attempt with zero-based index `attempt`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.config.backoff_multiplier.powi(attempt as i32);
        let delay_nanos = self.config.base_delay.as_nanos() as f64 * factor;
        let max_nanos = self.config.max_delay.as_nanos() as f64;

        if !delay_nanos.is_finite() || delay_nanos >= max_nanos {
            self.config.max_delay
        } else {
            Duration::from_nanos(delay_nanos.max(0.0).round() as u64)
        }
    }

    /// Execute `operation` up to `max_retries + 1` times
    ///
    /// Errors for which `should_retry` returns false are returned immediately.
    /// When every attempt fails the last error is returned.
    pub async fn execute<F, Fut, T, E, P>(&self, mut operation: F, should_retry: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let max_attempts = self.config.max_retries.saturating_add(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(attempts = attempt + 1, "✅ Operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if !should_retry(&error) {
                        debug!(attempt = attempt + 1, "Error is not retryable, giving up");
                        return Err(error);
                    }

                    if attempt + 1 >= max_attempts {
                        warn!(attempts = max_attempts, "🔁 Retries exhausted");
                        return Err(error);
                    }

                    let delay = self.delay_for_attempt(attempt);
                    debug!(
                        attempt = attempt + 1,
                        max_attempts = max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "🔁 Retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
