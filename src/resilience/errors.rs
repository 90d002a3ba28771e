//! # Resilience Error Types
//!
//! Structured error types for the resilience layer. Dependency errors keep the
//! original error as their source; breaker-open rejections are cheap to build
//! and always carry the next permitted attempt.

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`crate::resilience::CircuitBreaker::execute`]
#[derive(Debug, Error)]
pub enum CircuitBreakerError<E> {
    /// Circuit is open, the operation was not invoked
    #[error("Circuit breaker is open for {component}, next attempt at {next_attempt}")]
    CircuitOpen {
        component: String,
        next_attempt: DateTime<Utc>,
        retry_after: Duration,
    },

    /// Operation did not finish within the configured call timeout
    #[error("Operation for {component} timed out after {}ms", timeout.as_millis())]
    Timeout {
        component: String,
        timeout: Duration,
    },

    /// Operation failed and the failure was recorded
    #[error("Operation for {component} failed: {source}")]
    OperationFailed {
        component: String,
        #[source]
        source: E,
    },
}

impl<E> CircuitBreakerError<E> {
    /// Name of the component whose breaker produced this error
    pub fn component(&self) -> &str {
        match self {
            Self::CircuitOpen { component, .. }
            | Self::Timeout { component, .. }
            | Self::OperationFailed { component, .. } => component,
        }
    }

    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Hint for callers surfacing a retry-after value upstream
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::CircuitOpen { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// The wrapped operation error, if the operation ran and failed
    pub fn operation_error(&self) -> Option<&E> {
        match self {
            Self::OperationFailed { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn into_operation_error(self) -> Option<E> {
        match self {
            Self::OperationFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Caller errors raised by breaker configuration and registry lookups
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResilienceError {
    #[error("No circuit breaker registered for component: {name}")]
    BreakerNotFound { name: String },

    #[error("Invalid circuit breaker configuration: {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Circuit breaker limit reached: {limit} breakers already registered")]
    BreakerLimitReached { limit: usize },
}

impl ResilienceError {
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
