//! # Protected Dependency
//!
//! Binds a named circuit breaker to a retry handler so command handlers can
//! guard a dependency with one call. Composition order is the caller's choice:
//!
//! - [`ProtectedDependency::call_retry_inside`]: retries happen inside a single
//!   breaker call, so the breaker only observes the final outcome. The breaker's
//!   call timeout bounds the whole retry sequence.
//! - [`ProtectedDependency::call_breaker_inside`]: every attempt goes through
//!   the breaker and is recorded; open-circuit rejections are never retried.

use crate::resilience::{
    CircuitBreaker, CircuitBreakerError, CircuitBreakerManager, ResilienceError, RetryHandler,
};
use std::future::Future;
use std::sync::Arc;

/// A dependency guarded by a circuit breaker and a retry handler
#[derive(Debug, Clone)]
pub struct ProtectedDependency {
    breaker: Arc<CircuitBreaker>,
    retry: RetryHandler,
}

impl ProtectedDependency {
    pub fn new(breaker: Arc<CircuitBreaker>, retry: RetryHandler) -> Self {
        Self { breaker, retry }
    }

    /// Resolve the breaker for `component_name` from the manager
    pub fn from_manager(
        manager: &CircuitBreakerManager,
        component_name: &str,
        retry: RetryHandler,
    ) -> Result<Self, ResilienceError> {
        Ok(Self::new(manager.get_or_create(component_name)?, retry))
    }

    pub fn component_name(&self) -> &str {
        self.breaker.name()
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Single attempt through the breaker
    pub async fn call<F, Fut, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.breaker.execute(operation).await
    }

    /// Retry transient errors inside one breaker call
    pub async fn call_retry_inside<F, Fut, T, E, P>(
        &self,
        operation: F,
        should_retry: P,
    ) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let retry = &self.retry;
        self.breaker
            .execute(move || async move { retry.execute(operation, should_retry).await })
            .await
    }

    /// Send every attempt through the breaker, retrying only retryable failures
    ///
    /// Timeouts are retried; open-circuit rejections are returned at once.
    pub async fn call_breaker_inside<F, Fut, T, E, P>(
        &self,
        operation: F,
        should_retry: P,
    ) -> Result<T, CircuitBreakerError<E>>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let breaker = &self.breaker;
        let operation = &operation;
        self.retry
            .execute(
                move || breaker.execute(operation),
                |error: &CircuitBreakerError<E>| match error {
                    CircuitBreakerError::CircuitOpen { .. } => false,
                    CircuitBreakerError::Timeout { .. } => true,
                    CircuitBreakerError::OperationFailed { source, .. } => should_retry(source),
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::{CircuitBreakerOverrides, CircuitState, RetryConfig};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn dependency(minimum_requests: u32) -> ProtectedDependency {
        let manager = CircuitBreakerManager::new();
        manager
            .create_breaker(
                "court_filing_api",
                CircuitBreakerOverrides::default()
                    .minimum_requests(minimum_requests)
                    .success_threshold(1),
            )
            .unwrap();
        ProtectedDependency::from_manager(
            &manager,
            "court_filing_api",
            RetryHandler::new(RetryConfig {
                max_retries: 2,
                base_delay: Duration::from_millis(10),
                max_delay: Duration::from_millis(100),
                backoff_multiplier: 2.0,
            }),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_inside_records_single_outcome() {
        let protected = dependency(10);
        let calls = Arc::new(AtomicU32::new(0));

        let result = protected
            .call_retry_inside(
                || {
                    let calls = calls.clone();
                    async move {
                        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                            Err("flaky")
                        } else {
                            Ok(42)
                        }
                    }
                },
                |_| true,
            )
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let metrics = protected.breaker().metrics();
        assert_eq!(metrics.total_requests, 1);
        assert_eq!(metrics.successful_requests, 1);
        assert_eq!(metrics.failed_requests, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_breaker_inside_records_every_attempt() {
        let protected = dependency(10);
        let calls = Arc::new(AtomicU32::new(0));

        let result = protected
            .call_breaker_inside(
                || {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err::<(), _>("down")
                    }
                },
                |_| true,
            )
            .await;

        assert!(matches!(
            result,
            Err(CircuitBreakerError::OperationFailed { source: "down", .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(protected.breaker().metrics().failed_requests, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_breaker_inside_stops_when_circuit_opens() {
        let protected = dependency(1);
        let calls = Arc::new(AtomicU32::new(0));

        let result = protected
            .call_breaker_inside(
                || {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err::<(), _>("down")
                    }
                },
                |_| true,
            )
            .await;

        // First failure trips the circuit, the retry is rejected and not retried again
        assert!(matches!(result, Err(CircuitBreakerError::CircuitOpen { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(protected.breaker().state(), CircuitState::Open);
        assert_eq!(protected.breaker().metrics().rejected_requests, 1);
    }
}
