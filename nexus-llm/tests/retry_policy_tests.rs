//! Retry policy laws and end-to-end backoff timing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use nexus_core::{LlmError, NexusError, NexusResult, RetryConfig};
use nexus_llm::RetryingCaller;
use proptest::prelude::*;
use tokio::time::Instant;

proptest! {
    #[test]
    fn prop_delays_double_until_capped(initial_ms in 1u64..5_000, retries in 0u32..10) {
        let policy = RetryConfig::new(retries, Duration::from_millis(initial_ms));
        let mut previous = Duration::ZERO;
        for n in 0..retries {
            let delay = policy.delay_for(n);
            prop_assert!(delay >= previous);
            prop_assert!(delay <= policy.max_backoff);
            if delay < policy.max_backoff && n > 0 {
                prop_assert_eq!(delay, previous * 2);
            }
            previous = delay;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_background_policy_timing() {
    let counter = AtomicU32::new(0);
    let calls = &counter;
    let caller = RetryingCaller::new(RetryConfig::background());
    let started = Instant::now();

    let result: NexusResult<()> = caller
        .call("pulse.scout", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(NexusError::from(LlmError::RateLimited {
                provider: "gemini".to_string(),
                message: "429".to_string(),
            }))
        })
        .await;

    assert!(result.is_err_and(|e| e.is_rate_limited()));
    assert_eq!(counter.load(Ordering::SeqCst), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(3 + 6));
}

#[tokio::test(start_paused = true)]
async fn test_parse_failure_not_retried() {
    let counter = AtomicU32::new(0);
    let calls = &counter;
    let caller = RetryingCaller::new(RetryConfig::interactive());

    let result: NexusResult<()> = caller
        .call("books", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(NexusError::from(LlmError::InvalidResponse {
                provider: "gemini".to_string(),
                reason: "quota field missing".to_string(),
            }))
        })
        .await;

    assert!(result.is_err());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}
