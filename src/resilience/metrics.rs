//! # Circuit Breaker Metrics
//!
//! Point-in-time snapshots of circuit breaker activity, polled by health-check
//! and dashboard endpoints.

use crate::resilience::CircuitState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of a single circuit breaker's counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitBreakerMetrics {
    /// Every call to `execute`, including rejected ones
    pub total_requests: u64,

    /// Calls that completed successfully
    pub successful_requests: u64,

    /// Calls that failed, timeouts included
    pub failed_requests: u64,

    /// Calls that exceeded the call timeout
    pub timeouts: u64,

    /// Calls rejected while the circuit was open
    pub rejected_requests: u64,

    /// Running average latency of completed calls in milliseconds
    pub average_response_time_ms: f64,

    /// State at the time of the snapshot
    pub current_state: CircuitState,

    /// When the breaker last changed state
    pub state_changed_at: DateTime<Utc>,

    /// When the most recent failure was recorded
    pub last_failure_at: Option<DateTime<Utc>>,

    /// Earliest time an open circuit lets a probe through
    pub next_attempt_at: Option<DateTime<Utc>>,

    /// Samples currently inside the monitoring window
    pub window_samples: usize,

    /// Failure ratio over the monitoring window
    pub window_failure_rate: f64,
}

impl CircuitBreakerMetrics {
    /// Create new metrics instance with zero values
    pub fn new() -> Self {
        Self {
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            timeouts: 0,
            rejected_requests: 0,
            average_response_time_ms: 0.0,
            current_state: CircuitState::Closed,
            state_changed_at: Utc::now(),
            last_failure_at: None,
            next_attempt_at: None,
            window_samples: 0,
            window_failure_rate: 0.0,
        }
    }

    /// Calls that ran to completion (success, failure or timeout)
    pub fn completed_requests(&self) -> u64 {
        self.successful_requests + self.failed_requests
    }

    /// Lifetime success ratio, 0.0 when nothing has completed
    pub fn success_rate(&self) -> f64 {
        let completed = self.completed_requests();
        if completed == 0 {
            return 0.0;
        }
        self.successful_requests as f64 / completed as f64
    }

    /// Get human-readable state description
    pub fn state_description(&self) -> &'static str {
        match self.current_state {
            CircuitState::Closed => "Healthy - Normal operation",
            CircuitState::Open => "Failing - Rejecting all calls",
            CircuitState::HalfOpen => "Recovering - Testing dependency health",
        }
    }

    /// Format metrics for logging
    pub fn format_summary(&self) -> String {
        format!(
            "State: {} | Calls: {} | Success: {:.1}% | Failures: {} | Timeouts: {} | Rejected: {} | Avg Duration: {:.2}ms",
            self.state_description(),
            self.total_requests,
            self.success_rate() * 100.0,
            self.failed_requests,
            self.timeouts,
            self.rejected_requests,
            self.average_response_time_ms
        )
    }
}

impl Default for CircuitBreakerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Health entry for one breaker, as returned by the manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakerHealth {
    pub state: CircuitState,
    pub healthy: bool,
    pub failure_rate: f64,
    pub metrics: CircuitBreakerMetrics,
}

/// Aggregate view over every breaker a manager owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemCircuitBreakerMetrics {
    pub total_breakers: usize,
    pub closed: usize,
    pub open: usize,
    pub half_open: usize,
    pub total_requests: u64,
    pub rejected_requests: u64,
    pub breakers: BTreeMap<String, BreakerHealth>,
}

impl SystemCircuitBreakerMetrics {
    pub fn from_health(breakers: BTreeMap<String, BreakerHealth>) -> Self {
        let mut summary = Self {
            total_breakers: breakers.len(),
            closed: 0,
            open: 0,
            half_open: 0,
            total_requests: 0,
            rejected_requests: 0,
            breakers: BTreeMap::new(),
        };

        for health in breakers.values() {
            match health.state {
                CircuitState::Closed => summary.closed += 1,
                CircuitState::Open => summary.open += 1,
                CircuitState::HalfOpen => summary.half_open += 1,
            }
            summary.total_requests += health.metrics.total_requests;
            summary.rejected_requests += health.metrics.rejected_requests;
        }

        summary.breakers = breakers;
        summary
    }

    /// True when no breaker is open
    pub fn is_healthy(&self) -> bool {
        self.open == 0
    }

    /// Names of breakers currently rejecting calls
    pub fn open_breakers(&self) -> Vec<&str> {
        self.breakers
            .iter()
            .filter(|(_, health)| health.state == CircuitState::Open)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
