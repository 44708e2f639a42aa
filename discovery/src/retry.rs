use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Bounded retry with exponential backoff, shared by every network-facing
/// operation in the pipeline.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt after `attempt` (zero-based) failed:
    /// `base_delay * 2^attempt`.
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Runs `op` until it succeeds or `policy.max_attempts` consecutive failures
/// accumulate. The final error is propagated to the caller, never swallowed;
/// a single success short-circuits immediately. Every failed attempt is
/// logged with its attempt number.
pub async fn with_retry<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= attempts {
                    tracing::error!(
                        target: "atp_retry",
                        %err,
                        attempts,
                        "all retry attempts failed"
                    );
                    return Err(err);
                }
                let wait = policy.backoff(attempt - 1);
                tracing::warn!(
                    target: "atp_retry",
                    %err,
                    attempt,
                    attempts,
                    wait_ms = wait.as_millis() as u64,
                    "attempt failed, backing off"
                );
                tokio::time::sleep(wait).await;
            }
        }
    }
}
