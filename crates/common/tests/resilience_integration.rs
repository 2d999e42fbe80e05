//! Integration tests for the resilience module
//!
//! Exercises the circuit breaker and retry policy together, including the
//! composition ordering used by the provisioning gateway: the breaker wraps
//! a full retry sequence and judges its aggregate outcome.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lineforge_common::resilience::{
    BreakerError, CircuitBreaker, CircuitBreakerConfig, CircuitState, MockClock, RetryClass,
    RetryConfig, RetryError, RetryPolicy,
};

/// Custom error type for testing.
#[derive(Debug, Clone)]
struct TestError {
    message: &'static str,
    retryable: bool,
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TestError {}

impl RetryClass for TestError {
    fn is_retryable(&self) -> bool {
        self.retryable
    }
}

fn transient() -> TestError {
    TestError { message: "connection reset", retryable: true }
}

fn fast_retry(max_retries: u32) -> RetryPolicy {
    let config = RetryConfig::builder()
        .max_retries(max_retries)
        .base_delay(Duration::from_millis(1))
        .max_delay(Duration::from_millis(5))
        .no_jitter()
        .build()
        .expect("valid retry config");
    RetryPolicy::new(config).expect("valid retry policy")
}

fn test_breaker(threshold: u32, clock: MockClock) -> CircuitBreaker<MockClock> {
    let config = CircuitBreakerConfig::builder()
        .failure_threshold(threshold)
        .recovery_timeout(Duration::from_secs(5))
        .build()
        .expect("valid breaker config");
    CircuitBreaker::with_clock(config, clock).expect("valid breaker")
}

/// A request that succeeds after two retries counts as exactly one success
/// for the breaker: retries never feed the failure counter individually.
#[tokio::test(flavor = "multi_thread")]
async fn test_breaker_sees_retry_sequence_as_single_success() {
    let breaker = test_breaker(2, MockClock::new());
    let retry = fast_retry(3);
    let attempts = Arc::new(AtomicU32::new(0));
    let attempts_clone = Arc::clone(&attempts);

    let result = breaker
        .execute(|| {
            let retry = retry.clone();
            let attempts = Arc::clone(&attempts_clone);
            async move {
                retry
                    .execute(|| {
                        let attempts = Arc::clone(&attempts);
                        async move {
                            let n = attempts.fetch_add(1, Ordering::SeqCst);
                            if n < 2 {
                                Err(transient())
                            } else {
                                Ok("recovered")
                            }
                        }
                    })
                    .await
            }
        })
        .await;

    assert_eq!(result.expect("aggregate outcome is success"), "recovered");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);

    let stats = breaker.stats();
    assert_eq!(stats.state, CircuitState::Closed);
    assert_eq!(stats.failure_count, 0, "transient blips must not accumulate");
    assert_eq!(stats.total_requests, 1, "one breaker-level request");
}

/// A request that exhausts all retries counts as exactly one failure for the
/// breaker, so a persistently failing dependency still opens the circuit.
#[tokio::test(flavor = "multi_thread")]
async fn test_exhausted_retry_sequence_counts_as_one_breaker_failure() {
    let breaker = test_breaker(2, MockClock::new());
    let retry = fast_retry(2);
    let attempts = Arc::new(AtomicU32::new(0));

    for round in 1..=2u32 {
        let attempts_clone = Arc::clone(&attempts);
        let result: Result<(), _> = breaker
            .execute(|| {
                let retry = retry.clone();
                async move {
                    retry
                        .execute(|| {
                            let attempts = Arc::clone(&attempts_clone);
                            async move {
                                attempts.fetch_add(1, Ordering::SeqCst);
                                Err::<(), _>(transient())
                            }
                        })
                        .await
                }
            })
            .await;

        assert!(matches!(result, Err(BreakerError::Operation { .. })));
        assert_eq!(breaker.stats().failure_count, round);
        assert_eq!(attempts.load(Ordering::SeqCst), round * 3, "3 attempts per sequence");
    }

    assert_eq!(breaker.state(), CircuitState::Open, "opens after 2 exhausted sequences");

    // A further call is rejected before any retry attempt runs
    let attempts_clone = Arc::clone(&attempts);
    let result: Result<(), BreakerError<RetryError<TestError>>> = breaker
        .execute(|| {
            let retry = retry.clone();
            async move {
                retry
                    .execute(|| {
                        let attempts = Arc::clone(&attempts_clone);
                        async move {
                            attempts.fetch_add(1, Ordering::SeqCst);
                            Err::<(), _>(transient())
                        }
                    })
                    .await
            }
        })
        .await;

    assert!(matches!(result, Err(BreakerError::Open)));
    assert_eq!(attempts.load(Ordering::SeqCst), 6, "short-circuit runs no attempts");
}

/// Full recovery cycle: open on failures, probe after cooldown, close after
/// three consecutive successful probes.
#[tokio::test(flavor = "multi_thread")]
async fn test_open_probe_close_cycle() {
    let clock = MockClock::new();
    let breaker = test_breaker(1, clock.clone());
    let retry = fast_retry(0);

    let result: Result<(), _> = breaker
        .execute(|| {
            let retry = retry.clone();
            async move { retry.execute(|| async { Err::<(), _>(transient()) }).await }
        })
        .await;
    assert!(result.is_err());
    assert_eq!(breaker.state(), CircuitState::Open);

    clock.advance(Duration::from_secs(6));

    for _ in 0..3 {
        let result = breaker
            .execute(|| {
                let retry = retry.clone();
                async move { retry.execute(|| async { Ok::<_, TestError>(()) }).await }
            })
            .await;
        assert!(result.is_ok());
    }

    assert_eq!(breaker.state(), CircuitState::Closed);
}

/// Non-retryable failures pass straight through the retry layer and still
/// register as a single breaker failure.
#[tokio::test(flavor = "multi_thread")]
async fn test_non_retryable_single_attempt_through_composition() {
    let breaker = test_breaker(5, MockClock::new());
    let retry = fast_retry(10);
    let attempts = Arc::new(AtomicU32::new(0));
    let attempts_clone = Arc::clone(&attempts);

    let result: Result<(), _> = breaker
        .execute(|| {
            let retry = retry.clone();
            async move {
                retry
                    .execute(|| {
                        let attempts = Arc::clone(&attempts_clone);
                        async move {
                            attempts.fetch_add(1, Ordering::SeqCst);
                            Err::<(), _>(TestError { message: "bad request", retryable: false })
                        }
                    })
                    .await
            }
        })
        .await;

    match result {
        Err(BreakerError::Operation { source: RetryError::NonRetryable { .. } }) => {}
        other => panic!("expected non-retryable operation failure, got {other:?}"),
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(breaker.stats().failure_count, 1);
}

/// Concurrent call chains share one breaker without corrupting its counters.
#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_calls_share_breaker_safely() {
    let breaker = Arc::new(CircuitBreaker::with_defaults());
    let mut handles = vec![];

    for _ in 0..16 {
        let breaker = Arc::clone(&breaker);
        handles.push(tokio::spawn(async move {
            breaker.execute(|| async { Ok::<_, TestError>(()) }).await
        }));
    }

    for handle in handles {
        assert!(handle.await.expect("task should not panic").is_ok());
    }

    let stats = breaker.stats();
    assert_eq!(stats.total_requests, 16);
    assert_eq!(stats.rejected_requests, 0);
    assert_eq!(stats.state, CircuitState::Closed);
}
