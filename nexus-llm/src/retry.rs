//! Rate-limit retry with exponential backoff.
//!
//! Only failures that classify as [`ErrorClass::RateLimited`] are retried;
//! anything else propagates on the first attempt.
//!
//! [`ErrorClass::RateLimited`]: nexus_core::ErrorClass::RateLimited

use nexus_core::{NexusResult, RetryConfig};
use std::future::Future;

/// Run `call`, retrying rate-limited failures per `policy`.
///
/// Retry `n` (zero-based) sleeps `policy.delay_for(n)` first. When retries
/// run out the last error is returned unchanged.
pub async fn call_with_retry<T, F, Fut>(
    policy: &RetryConfig,
    operation: &str,
    mut call: F,
) -> NexusResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = NexusResult<T>>,
{
    let mut retry = 0u32;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if err.class().is_retryable() && retry < policy.max_retries => {
                let delay = policy.delay_for(retry);
                tracing::warn!(
                    operation,
                    attempt = retry + 1,
                    attempts_left = policy.max_retries - retry,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                retry += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// A retry policy bound to a call site class (interactive or background).
#[derive(Debug, Clone)]
pub struct RetryingCaller {
    policy: RetryConfig,
}

impl RetryingCaller {
    pub fn new(policy: RetryConfig) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryConfig {
        &self.policy
    }

    pub async fn call<T, F, Fut>(&self, operation: &str, call: F) -> NexusResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = NexusResult<T>>,
    {
        call_with_retry(&self.policy, operation, call).await
    }
}
