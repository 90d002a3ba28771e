//! # Circuit Breaker Implementation
//!
//! Provides fault isolation for calls to slow or unreliable dependencies (AI
//! providers, external APIs, the database). This implementation follows the
//! classic circuit breaker pattern with three states: Closed (normal
//! operation), Open (failing fast), and Half-Open (testing recovery).
//!
//! The trip decision is taken over a time-bounded sliding window of call
//! outcomes rather than a consecutive-failure count: the circuit opens once the
//! window holds at least `minimum_requests` samples and the failure ratio in it
//! reaches `failure_threshold`. Lifetime counters are kept separately for
//! observability and never influence state transitions.

use crate::resilience::{
    CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerMetrics, ResilienceError,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Circuit breaker states representing the current operational mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Normal operation - all calls are allowed through
    Closed = 0,
    /// Failure mode - all calls fail fast without executing
    Open = 1,
    /// Testing recovery - calls are let through on probation
    HalfOpen = 2,
}

impl From<u8> for CircuitState {
    fn from(value: u8) -> Self {
        match value {
            0 => CircuitState::Closed,
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Open, // Default to safest state
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => f.write_str("CLOSED"),
            CircuitState::Open => f.write_str("OPEN"),
            CircuitState::HalfOpen => f.write_str("HALF_OPEN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
    Timeout,
}

impl Outcome {
    fn is_success(self) -> bool {
        self == Outcome::Success
    }
}

/// One completed call inside the monitoring window
#[derive(Debug, Clone, Copy)]
struct Sample {
    recorded_at: Instant,
    success: bool,
}

/// Mutable breaker state, guarded by a single mutex
#[derive(Debug)]
struct BreakerInner {
    /// Bumped on every state transition; admissions are tagged with it
    generation: u64,
    window: VecDeque<Sample>,
    half_open_successes: u32,
    next_attempt: Option<Instant>,
    next_attempt_at: Option<DateTime<Utc>>,
    metrics: CircuitBreakerMetrics,
}

impl BreakerInner {
    /// Drop samples older than the monitoring window
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(oldest) = self.window.front() {
            if now.saturating_duration_since(oldest.recorded_at) > window {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }

    /// (samples, failures) currently in the window
    fn window_counts(&self) -> (usize, usize) {
        let failures = self.window.iter().filter(|s| !s.success).count();
        (self.window.len(), failures)
    }

    fn window_failure_rate(&self) -> f64 {
        let (samples, failures) = self.window_counts();
        if samples == 0 {
            return 0.0;
        }
        failures as f64 / samples as f64
    }
}

/// Circuit breaker protecting a single named dependency
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Component name for logging and metrics
    name: String,

    /// Current circuit state, readable without taking the lock
    state: AtomicU8,

    /// Validated configuration
    config: CircuitBreakerConfig,

    /// Window, counters and timestamps
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker, validating the configuration once
    pub fn new(
        name: impl Into<String>,
        config: CircuitBreakerConfig,
    ) -> Result<Self, ResilienceError> {
        config.validate()?;
        let name = name.into();

        info!(
            component = %name,
            failure_threshold = config.failure_threshold,
            minimum_requests = config.minimum_requests,
            recovery_timeout_ms = config.recovery_timeout.as_millis() as u64,
            monitoring_window_ms = config.monitoring_window.as_millis() as u64,
            success_threshold = config.success_threshold,
            call_timeout_ms = config.call_timeout.as_millis() as u64,
            "🛡️ Circuit breaker initialized"
        );

        Ok(Self {
            name,
            state: AtomicU8::new(CircuitState::Closed as u8),
            config,
            inner: Mutex::new(BreakerInner {
                generation: 0,
                window: VecDeque::new(),
                half_open_successes: 0,
                next_attempt: None,
                next_attempt_at: None,
                metrics: CircuitBreakerMetrics::new(),
            }),
        })
    }

    /// Get current circuit state
    pub fn state(&self) -> CircuitState {
        CircuitState::from(self.state.load(Ordering::Acquire))
    }

    /// Get component name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Execute an operation with circuit breaker protection
    ///
    /// While the circuit is open and the recovery timeout has not elapsed the
    /// operation is never invoked. Otherwise it runs under the configured call
    /// timeout; a timed-out operation is dropped, so a late result is never
    /// recorded.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let generation = self.try_acquire()?;

        let started = Instant::now();
        let result = tokio::time::timeout(self.config.call_timeout, operation()).await;
        let duration = started.elapsed();

        match result {
            Ok(Ok(value)) => {
                self.record(Outcome::Success, duration, generation);
                Ok(value)
            }
            Ok(Err(source)) => {
                self.record(Outcome::Failure, duration, generation);
                Err(CircuitBreakerError::OperationFailed {
                    component: self.name.clone(),
                    source,
                })
            }
            Err(_) => {
                self.record(Outcome::Timeout, duration, generation);
                Err(CircuitBreakerError::Timeout {
                    component: self.name.clone(),
                    timeout: self.config.call_timeout,
                })
            }
        }
    }

    /// Count the request and decide whether it may proceed
    ///
    /// Returns the state generation the call was admitted under.
    fn try_acquire<E>(&self) -> Result<u64, CircuitBreakerError<E>> {
        let mut inner = self.inner.lock();
        inner.metrics.total_requests += 1;

        if self.state() != CircuitState::Open {
            return Ok(inner.generation);
        }

        let now = Instant::now();
        match inner.next_attempt {
            Some(next_attempt) if now < next_attempt => {
                inner.metrics.rejected_requests += 1;
                let retry_after = next_attempt.saturating_duration_since(now);

                debug!(
                    component = %self.name,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "⛔ Call rejected, circuit open"
                );

                Err(CircuitBreakerError::CircuitOpen {
                    component: self.name.clone(),
                    next_attempt: inner
                        .next_attempt_at
                        .unwrap_or_else(|| wall_clock_after(retry_after)),
                    retry_after,
                })
            }
            Some(_) => {
                self.transition_to_half_open(&mut inner);
                Ok(inner.generation)
            }
            None => {
                // Open without a recorded deadline shouldn't happen, let the probe through
                warn!(component = %self.name, "Circuit open but no next attempt recorded");
                self.transition_to_half_open(&mut inner);
                Ok(inner.generation)
            }
        }
    }

    /// Record a completed call and apply any resulting state transition
    ///
    /// Calls admitted under an earlier state generation only update the
    /// lifetime counters; they never enter the window or drive a transition.
    fn record(&self, outcome: Outcome, duration: Duration, generation: u64) {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let current = generation == inner.generation;

        if current {
            inner.window.push_back(Sample {
                recorded_at: now,
                success: outcome.is_success(),
            });
        }
        inner.prune(now, self.config.monitoring_window);

        {
            let metrics = &mut inner.metrics;
            match outcome {
                Outcome::Success => metrics.successful_requests += 1,
                Outcome::Failure => metrics.failed_requests += 1,
                Outcome::Timeout => {
                    metrics.failed_requests += 1;
                    metrics.timeouts += 1;
                }
            }
            if !outcome.is_success() {
                metrics.last_failure_at = Some(Utc::now());
            }

            let completed = metrics.completed_requests() as f64;
            let duration_ms = duration.as_secs_f64() * 1000.0;
            metrics.average_response_time_ms =
                (metrics.average_response_time_ms * (completed - 1.0) + duration_ms) / completed;
        }

        match outcome {
            Outcome::Success => debug!(
                component = %self.name,
                duration_ms = duration.as_millis() as u64,
                "🟢 Operation succeeded"
            ),
            Outcome::Failure => warn!(
                component = %self.name,
                duration_ms = duration.as_millis() as u64,
                "🔴 Operation failed"
            ),
            Outcome::Timeout => warn!(
                component = %self.name,
                timeout_ms = self.config.call_timeout.as_millis() as u64,
                "⏱️ Operation timed out"
            ),
        }

        if !current {
            debug!(
                component = %self.name,
                admitted_generation = generation,
                current_generation = inner.generation,
                "Result from a call admitted before the last transition"
            );
            return;
        }

        match self.state() {
            CircuitState::Closed => {
                let (samples, failures) = inner.window_counts();
                if samples >= self.config.minimum_requests as usize
                    && failures as f64 / samples as f64 >= self.config.failure_threshold
                {
                    self.transition_to_open(&mut inner);
                }
            }
            CircuitState::HalfOpen => {
                if outcome.is_success() {
                    inner.half_open_successes += 1;
                    if inner.half_open_successes >= self.config.success_threshold {
                        self.transition_to_closed(&mut inner);
                    }
                } else {
                    // Any failure in half-open state immediately opens circuit
                    self.transition_to_open(&mut inner);
                }
            }
            CircuitState::Open => {}
        }
    }

    fn set_state(&self, inner: &mut BreakerInner, state: CircuitState) {
        inner.generation += 1;
        self.state.store(state as u8, Ordering::Release);
        inner.metrics.state_changed_at = Utc::now();
    }

    /// Transition to open state (failing fast)
    fn transition_to_open(&self, inner: &mut BreakerInner) {
        let (samples, failures) = inner.window_counts();
        self.set_state(inner, CircuitState::Open);
        inner.half_open_successes = 0;
        inner.next_attempt = Some(deadline_after(Instant::now(), self.config.recovery_timeout));
        inner.next_attempt_at = Some(wall_clock_after(self.config.recovery_timeout));

        error!(
            component = %self.name,
            window_samples = samples,
            window_failures = failures,
            failure_threshold = self.config.failure_threshold,
            recovery_timeout_ms = self.config.recovery_timeout.as_millis() as u64,
            "🔴 Circuit breaker opened (failing fast)"
        );
    }

    /// Transition to half-open state (testing recovery)
    fn transition_to_half_open(&self, inner: &mut BreakerInner) {
        self.set_state(inner, CircuitState::HalfOpen);
        inner.half_open_successes = 0;
        inner.next_attempt = None;
        inner.next_attempt_at = None;

        info!(
            component = %self.name,
            success_threshold = self.config.success_threshold,
            "🟡 Circuit breaker half-open (testing recovery)"
        );
    }

    /// Transition to closed state (normal operation)
    fn transition_to_closed(&self, inner: &mut BreakerInner) {
        self.set_state(inner, CircuitState::Closed);
        inner.half_open_successes = 0;
        inner.next_attempt = None;
        inner.next_attempt_at = None;
        // Failures that tripped the circuit must not count against the recovered dependency
        inner.window.clear();

        info!(
            component = %self.name,
            total_requests = inner.metrics.total_requests,
            "🟢 Circuit breaker closed (recovered)"
        );
    }

    /// Force circuit to open state (for emergency situations)
    pub fn force_open(&self) {
        warn!(component = %self.name, "🚨 Circuit breaker forced open");
        let mut inner = self.inner.lock();
        self.transition_to_open(&mut inner);
    }

    /// Force circuit to closed state (for emergency recovery)
    pub fn force_close(&self) {
        warn!(component = %self.name, "🚨 Circuit breaker forced closed");
        let mut inner = self.inner.lock();
        self.transition_to_closed(&mut inner);
    }

    /// Failure ratio over the current monitoring window, 0.0 when empty
    pub fn failure_rate(&self) -> f64 {
        let mut inner = self.inner.lock();
        inner.prune(Instant::now(), self.config.monitoring_window);
        inner.window_failure_rate()
    }

    /// Closed, or half-open with at least one success since entering it
    pub fn is_healthy(&self) -> bool {
        match self.state() {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => self.inner.lock().half_open_successes > 0,
        }
    }

    /// Get current metrics snapshot
    pub fn metrics(&self) -> CircuitBreakerMetrics {
        let mut inner = self.inner.lock();
        inner.prune(Instant::now(), self.config.monitoring_window);

        let mut snapshot = inner.metrics.clone();
        snapshot.current_state = self.state();
        snapshot.next_attempt_at = inner.next_attempt_at;
        snapshot.window_samples = inner.window.len();
        snapshot.window_failure_rate = inner.window_failure_rate();
        snapshot
    }
}

/// Roughly 30 years, used when a deadline would overflow the clock
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn deadline_after(now: Instant, delay: Duration) -> Instant {
    now.checked_add(delay)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// Wall-clock time `delay` from now, saturating at chrono's maximum
fn wall_clock_after(delay: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(delay)
        .ok()
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
