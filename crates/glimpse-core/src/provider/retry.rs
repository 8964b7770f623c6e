//! Retry executor for transient provider and download failures.
//!
//! Only transport-class errors are retried. Every attempt is bounded by a
//! timeout, and attempts are spaced by linear backoff.

use crate::error::RecognitionError;
use std::future::Future;
use std::time::Duration;

/// Attempt budget, backoff unit and per-attempt timeout.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Linear backoff unit
    pub base_delay: Duration,
    /// Upper bound for one attempt
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

/// Delay after the given failed attempt (1-based): `base_delay * attempt`.
pub fn backoff_duration(attempt: u32, base_delay: Duration) -> Duration {
    base_delay.saturating_mul(attempt)
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the attempt budget runs out.
///
/// `label` names the operation in timeout errors and logs.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, RecognitionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RecognitionError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let outcome = match tokio::time::timeout(policy.attempt_timeout, operation()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(RecognitionError::NetworkTransport {
                provider: label.to_string(),
                message: format!(
                    "timed out after {}ms",
                    policy.attempt_timeout.as_millis()
                ),
            }),
        };

        let error = match outcome {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => e,
        };

        if attempt >= max_attempts {
            return Err(RecognitionError::RetriesExhausted {
                attempts: attempt,
                last: Box::new(error),
            });
        }

        let delay = backoff_duration(attempt, policy.base_delay);
        tracing::warn!(
            "{label} attempt {attempt}/{max_attempts} failed: {error}. Retrying in {delay:?}"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
