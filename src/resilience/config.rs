//! # Circuit Breaker Configuration
//!
//! Typed, validated configuration for circuit breakers. Values are supplied in
//! memory; loading them from files or the environment is the job of
//! [`crate::config`].

use crate::resilience::ResilienceError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime configuration for a single circuit breaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Failure ratio (0.0, 1.0] within the monitoring window that trips the circuit
    pub failure_threshold: f64,

    /// Time spent open before a probe call is allowed through
    pub recovery_timeout: Duration,

    /// Age limit for samples considered by the trip decision
    pub monitoring_window: Duration,

    /// Minimum number of samples in the window before the circuit may trip
    pub minimum_requests: u32,

    /// Successes required in half-open state to close the circuit
    pub success_threshold: u32,

    /// Hard timeout applied to every protected call
    pub call_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 0.5,
            recovery_timeout: Duration::from_secs(60),
            monitoring_window: Duration::from_secs(300),
            minimum_requests: 10,
            success_threshold: 3,
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl CircuitBreakerConfig {
    /// Check the configuration for values that would make the breaker misbehave
    pub fn validate(&self) -> Result<(), ResilienceError> {
        if !(self.failure_threshold > 0.0 && self.failure_threshold <= 1.0) {
            return Err(ResilienceError::invalid_config(
                "failure_threshold",
                format!("must be within (0.0, 1.0], got {}", self.failure_threshold),
            ));
        }
        if self.minimum_requests == 0 {
            return Err(ResilienceError::invalid_config(
                "minimum_requests",
                "must be greater than 0",
            ));
        }
        if self.success_threshold == 0 {
            return Err(ResilienceError::invalid_config(
                "success_threshold",
                "must be greater than 0",
            ));
        }
        if self.recovery_timeout.is_zero() {
            return Err(ResilienceError::invalid_config(
                "recovery_timeout",
                "must be greater than zero",
            ));
        }
        if self.monitoring_window.is_zero() {
            return Err(ResilienceError::invalid_config(
                "monitoring_window",
                "must be greater than zero",
            ));
        }
        if self.call_timeout.is_zero() {
            return Err(ResilienceError::invalid_config(
                "call_timeout",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Partial configuration merged onto a base [`CircuitBreakerConfig`]
///
/// Unset fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircuitBreakerOverrides {
    pub failure_threshold: Option<f64>,
    pub recovery_timeout: Option<Duration>,
    pub monitoring_window: Option<Duration>,
    pub minimum_requests: Option<u32>,
    pub success_threshold: Option<u32>,
    pub call_timeout: Option<Duration>,
}

impl CircuitBreakerOverrides {
    pub fn failure_threshold(mut self, value: f64) -> Self {
        self.failure_threshold = Some(value);
        self
    }

    pub fn recovery_timeout(mut self, value: Duration) -> Self {
        self.recovery_timeout = Some(value);
        self
    }

    pub fn monitoring_window(mut self, value: Duration) -> Self {
        self.monitoring_window = Some(value);
        self
    }

    pub fn minimum_requests(mut self, value: u32) -> Self {
        self.minimum_requests = Some(value);
        self
    }

    pub fn success_threshold(mut self, value: u32) -> Self {
        self.success_threshold = Some(value);
        self
    }

    pub fn call_timeout(mut self, value: Duration) -> Self {
        self.call_timeout = Some(value);
        self
    }

    /// Merge these overrides onto `base`
    pub fn apply_to(&self, base: &CircuitBreakerConfig) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold.unwrap_or(base.failure_threshold),
            recovery_timeout: self.recovery_timeout.unwrap_or(base.recovery_timeout),
            monitoring_window: self.monitoring_window.unwrap_or(base.monitoring_window),
            minimum_requests: self.minimum_requests.unwrap_or(base.minimum_requests),
            success_threshold: self.success_threshold.unwrap_or(base.success_threshold),
            call_timeout: self.call_timeout.unwrap_or(base.call_timeout),
        }
    }
}

impl From<CircuitBreakerConfig> for CircuitBreakerOverrides {
    fn from(config: CircuitBreakerConfig) -> Self {
        Self {
            failure_threshold: Some(config.failure_threshold),
            recovery_timeout: Some(config.recovery_timeout),
            monitoring_window: Some(config.monitoring_window),
            minimum_requests: Some(config.minimum_requests),
            success_threshold: Some(config.success_threshold),
            call_timeout: Some(config.call_timeout),
        }
    }
}

/// Settings that apply to a [`crate::resilience::CircuitBreakerManager`] as a whole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalCircuitBreakerSettings {
    /// Maximum number of breakers the manager will hold
    pub max_breakers: usize,

    /// Whether unknown components get a breaker with default configuration on lookup
    pub auto_create_enabled: bool,
}

impl Default for GlobalCircuitBreakerSettings {
    fn default() -> Self {
        Self {
            max_breakers: 50,
            auto_create_enabled: true,
        }
    }
}
