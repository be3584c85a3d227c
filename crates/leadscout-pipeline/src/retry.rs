//! Exponential backoff around transient failures.
//!
//! Retryability comes from the error's own [`ErrorClass`] tag, assigned where
//! the raw failure was translated; nothing here inspects error internals.
//! Permanent errors propagate on first occurrence.

use std::future::Future;
use std::time::Duration;

use leadscout_core::{RateLimitConfig, Retryable};

/// Delay schedule for one retried operation: `base * multiplier^attempt`,
/// capped at `max_delay`, with at most `max_retries` retries after the
/// initial attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            multiplier: config.backoff_multiplier,
        }
    }

    /// Same delay schedule, different retry cap. The scrape path carries its
    /// own cap while sharing the delay curve.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Delay before the retry following failed attempt `attempt` (zero-based).
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn backoff_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let millis = policy.base_delay.as_millis() as f64 * policy.multiplier.powi(exponent);
    let capped = millis.min(policy.max_delay.as_millis() as f64);
    Duration::from_millis(capped.max(0.0) as u64)
}

/// Runs `operation`, retrying transient failures per `policy`. The exact
/// last error is propagated once retries are exhausted; permanent errors
/// are returned after a single invocation.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.error_class().is_transient() || attempt >= policy.max_retries {
                    return Err(err);
                }
                let delay = backoff_delay(policy, attempt);
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    class = ?err.error_class(),
                    error = %err,
                    "transient failure — retrying after backoff"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
