//! # Veilroute Resilience
//!
//! Generic timeout and bounded, jittered retry combinators. This is the
//! sole place network fallibility is handled: callers wrap the classifier
//! call here and see either success or one final exhausted error.
//!
//! Retry applies only to errors whose [`Retryable`] classification says so
//! (timeouts, network failures, rate limits). Validation and auth errors
//! propagate immediately — retrying them cannot help.

use rand::Rng;
use std::time::Duration;
use tracing::warn;
use veilroute_core::Retryable;

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempt count, including the first try.
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles each retry.
    pub base_backoff: Duration,
    /// Upper bound on any single backoff.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (1-based), with jitter.
    fn backoff(&self, attempt: u32) -> Duration {
        let exp = self.base_backoff.saturating_mul(1u32 << attempt.saturating_sub(1).min(16));
        let capped = exp.min(self.max_backoff);
        // Jitter in [0.5, 1.5) spreads concurrent retries apart.
        let factor: f64 = rand::rng().random_range(0.5..1.5);
        capped.mul_f64(factor)
    }
}

/// Race `fut` against a timer, converting an elapsed timer into the
/// caller's error type.
pub async fn with_timeout<T, E, F>(
    duration: Duration,
    fut: F,
    on_timeout: impl FnOnce(Duration) -> E,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout(duration)),
    }
}

/// Run `op` up to `policy.max_attempts` times, retrying only retryable
/// errors with exponential, jittered backoff. The last error is surfaced
/// when attempts are exhausted.
pub async fn with_retry<T, E, F, Fut>(label: &str, policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                let backoff = policy.backoff(attempt);
                warn!(
                    %label,
                    attempt,
                    max_attempts,
                    error = %err,
                    backoff_ms = backoff.as_millis() as u64,
                    "Retryable failure, backing off"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
