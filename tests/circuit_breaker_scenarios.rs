//! End-to-end breaker behavior through the manager and protected dependencies

mod common;

use common::*;
use lexdesk_core::resilience::{
    CircuitBreaker, CircuitBreakerError, CircuitBreakerManager, CircuitBreakerOverrides,
    CircuitState, GlobalCircuitBreakerSettings, ProtectedDependency, RetryHandler,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

async fn succeed(breaker: &CircuitBreaker) -> Result<(), CircuitBreakerError<&'static str>> {
    breaker.execute(|| async { Ok::<_, &'static str>(()) }).await
}

async fn fail(breaker: &CircuitBreaker) -> Result<(), CircuitBreakerError<&'static str>> {
    breaker.execute(|| async { Err::<(), _>("provider error") }).await
}

#[tokio::test(start_paused = true)]
async fn test_trip_reject_and_half_open_recovery() {
    let breaker = CircuitBreaker::new("ai_provider", fast_breaker_config(4, 2)).unwrap();

    succeed(&breaker).await.unwrap();
    succeed(&breaker).await.unwrap();
    assert!(fail(&breaker).await.is_err());
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert!(fail(&breaker).await.is_err());
    assert_eq!(breaker.state(), CircuitState::Open);

    // Fifth call is rejected and the operation never runs
    let invoked = Arc::new(AtomicU32::new(0));
    let rejected = breaker
        .execute(|| {
            let invoked = invoked.clone();
            async move {
                invoked.fetch_add(1, Ordering::SeqCst);
                Ok::<_, &'static str>(())
            }
        })
        .await;
    match rejected {
        Err(CircuitBreakerError::CircuitOpen { retry_after, .. }) => {
            assert!(retry_after <= Duration::from_secs(1));
        }
        other => panic!("expected CircuitOpen, got {other:?}"),
    }
    assert_eq!(invoked.load(Ordering::SeqCst), 0);

    tokio::time::advance(Duration::from_millis(1_001)).await;

    // Sixth call probes the dependency; one success is not enough to close
    succeed(&breaker).await.unwrap();
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
    assert!(breaker.is_healthy());

    succeed(&breaker).await.unwrap();
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(breaker.failure_rate(), 0.0);

    let metrics = breaker.metrics();
    assert_eq!(metrics.total_requests, 7);
    assert_eq!(metrics.rejected_requests, 1);
    assert_eq!(metrics.successful_requests, 4);
    assert_eq!(metrics.failed_requests, 2);
}

#[tokio::test(start_paused = true)]
async fn test_half_open_failure_reopens() {
    let breaker = CircuitBreaker::new("court_filing_api", fast_breaker_config(2, 3)).unwrap();

    let _ = fail(&breaker).await;
    let _ = fail(&breaker).await;
    assert_eq!(breaker.state(), CircuitState::Open);

    tokio::time::advance(Duration::from_secs(2)).await;
    let _ = fail(&breaker).await;
    assert_eq!(breaker.state(), CircuitState::Open);

    // Fresh deadline: still rejected just before it, allowed after
    tokio::time::advance(Duration::from_millis(900)).await;
    assert!(matches!(
        succeed(&breaker).await,
        Err(CircuitBreakerError::CircuitOpen { .. })
    ));
    tokio::time::advance(Duration::from_millis(200)).await;
    succeed(&breaker).await.unwrap();
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
}

#[tokio::test(start_paused = true)]
async fn test_old_failures_age_out_of_the_window() {
    let breaker = CircuitBreaker::new("database", fast_breaker_config(3, 1)).unwrap();

    let _ = fail(&breaker).await;
    let _ = fail(&breaker).await;
    assert_eq!(breaker.failure_rate(), 1.0);

    tokio::time::advance(Duration::from_secs(61)).await;
    assert_eq!(breaker.failure_rate(), 0.0);

    // Only one sample in the window now, below the minimum
    let _ = fail(&breaker).await;
    assert_eq!(breaker.state(), CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_slow_calls_time_out_and_count_as_failures() {
    let manager = CircuitBreakerManager::new();
    let breaker = manager
        .create_breaker(
            "ai_provider",
            CircuitBreakerOverrides::default()
                .call_timeout(Duration::from_millis(100))
                .minimum_requests(1),
        )
        .unwrap();

    let result = breaker
        .execute(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, &'static str>("late draft")
        })
        .await;

    assert!(matches!(result, Err(CircuitBreakerError::Timeout { .. })));
    let metrics = breaker.metrics();
    assert_eq!(metrics.timeouts, 1);
    assert_eq!(metrics.successful_requests, 0);
    assert_eq!(breaker.state(), CircuitState::Open);
}

#[tokio::test(start_paused = true)]
async fn test_manager_health_tracks_open_breakers() {
    let manager = CircuitBreakerManager::with_defaults(
        fast_breaker_config(1, 1),
        GlobalCircuitBreakerSettings {
            max_breakers: 3,
            auto_create_enabled: true,
        },
    )
    .unwrap();

    let database = manager.get_or_create("database").unwrap();
    let ai = manager.get_or_create("ai_provider").unwrap();
    succeed(&database).await.unwrap();
    let _ = fail(&ai).await;

    let health = manager.system_health();
    assert_eq!(health.total_breakers, 2);
    assert_eq!(health.open, 1);
    assert_eq!(health.open_breakers(), vec!["ai_provider"]);
    assert!(!health.is_healthy());

    let status = manager.get_health_status();
    assert!(status["database"].healthy);
    assert!(!status["ai_provider"].healthy);
    assert_eq!(status["ai_provider"].failure_rate, 1.0);

    manager.reset_all();
    assert_eq!(ai.state(), CircuitState::Closed);
    assert!(manager.system_health().is_healthy());
}

#[tokio::test(start_paused = true)]
async fn test_protected_dependency_fails_fast_once_open() {
    let manager = CircuitBreakerManager::with_defaults(
        fast_breaker_config(2, 1),
        GlobalCircuitBreakerSettings::default(),
    )
    .unwrap();
    let filing = ProtectedDependency::from_manager(
        &manager,
        "court_filing_api",
        RetryHandler::new(quick_retry(3)),
    )
    .unwrap();
    let calls = Arc::new(AtomicU32::new(0));

    let attempt = || {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>("503 from e-filing gateway")
        }
    };

    let first = filing.call_breaker_inside(attempt, |_| true).await;
    assert!(matches!(first, Err(CircuitBreakerError::CircuitOpen { .. })));
    // Two recorded failures trip the breaker; the third attempt is rejected
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let second = filing.call_retry_inside(attempt, |_| true).await;
    assert!(matches!(second, Err(CircuitBreakerError::CircuitOpen { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_calls_keep_counters_consistent() {
    const CALLS: u32 = 2_000;
    let config = lexdesk_core::resilience::CircuitBreakerConfig {
        failure_threshold: 1.0,
        minimum_requests: CALLS + 1,
        ..fast_breaker_config(1, 1)
    };
    let breaker = Arc::new(CircuitBreaker::new("database", config).unwrap());

    let tasks: Vec<_> = (0..CALLS)
        .map(|i| {
            let breaker = breaker.clone();
            tokio::spawn(async move {
                breaker
                    .execute(|| async move {
                        tokio::task::yield_now().await;
                        if i % 3 == 0 {
                            Err("connection reset")
                        } else {
                            Ok(i)
                        }
                    })
                    .await
                    .is_ok()
            })
        })
        .collect();

    let mut succeeded = 0u64;
    for outcome in futures::future::join_all(tasks).await {
        if outcome.unwrap() {
            succeeded += 1;
        }
    }

    let metrics = breaker.metrics();
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(metrics.total_requests, u64::from(CALLS));
    assert_eq!(metrics.successful_requests, succeeded);
    assert_eq!(
        metrics.successful_requests + metrics.failed_requests,
        u64::from(CALLS)
    );
    assert_eq!(metrics.failed_requests, u64::from(CALLS.div_ceil(3)));
    assert_eq!(metrics.window_samples, CALLS as usize);
    assert_eq!(metrics.rejected_requests, 0);
}
