//! # Command Error Types
//!
//! Everything a dispatch can fail with. Dependency failures keep the breaker's
//! component name so callers can tell a failing dependency from an open
//! circuit and surface a retry-after hint for the latter.

use crate::policy::AuthorizationError;
use crate::resilience::CircuitBreakerError;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    /// Programming or configuration error: nothing handles this command type
    #[error("No handler registered for command type: {command_type}")]
    HandlerNotFound { command_type: &'static str },

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Dependency {component} unavailable until {next_attempt}")]
    DependencyUnavailable {
        component: String,
        next_attempt: DateTime<Utc>,
        retry_after: Duration,
    },

    #[error("Dependency {component} timed out after {}ms", timeout.as_millis())]
    DependencyTimeout { component: String, timeout: Duration },

    #[error("Dependency {component} failed: {source}")]
    DependencyFailed {
        component: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Authorized dispatch requires a policy service")]
    PolicyServiceMissing,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CommandError {
    /// Whether the same command may succeed if retried later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DependencyUnavailable { .. }
                | Self::DependencyTimeout { .. }
                | Self::DependencyFailed { .. }
        )
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::DependencyUnavailable { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }
}

impl<E> From<CircuitBreakerError<E>> for CommandError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: CircuitBreakerError<E>) -> Self {
        match error {
            CircuitBreakerError::CircuitOpen {
                component,
                next_attempt,
                retry_after,
            } => Self::DependencyUnavailable {
                component,
                next_attempt,
                retry_after,
            },
            CircuitBreakerError::Timeout { component, timeout } => {
                Self::DependencyTimeout { component, timeout }
            }
            CircuitBreakerError::OperationFailed { component, source } => Self::DependencyFailed {
                component,
                source: Box::new(source),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_breaker_errors_keep_component() {
        let open: CommandError = CircuitBreakerError::<io::Error>::CircuitOpen {
            component: "database".to_string(),
            next_attempt: Utc::now(),
            retry_after: Duration::from_secs(30),
        }
        .into();
        assert!(open.is_retryable());
        assert_eq!(open.retry_after(), Some(Duration::from_secs(30)));

        let failed: CommandError = CircuitBreakerError::OperationFailed {
            component: "database".to_string(),
            source: io::Error::new(io::ErrorKind::ConnectionReset, "reset"),
        }
        .into();
        match failed {
            CommandError::DependencyFailed { component, source } => {
                assert_eq!(component, "database");
                assert!(source.to_string().contains("reset"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_caller_errors_are_not_retryable() {
        let error = CommandError::HandlerNotFound {
            command_type: "DeleteClientCommand",
        };
        assert!(!error.is_retryable());
        assert!(error.to_string().contains("DeleteClientCommand"));
    }
}
