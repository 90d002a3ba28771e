//! # Resilience Module
//!
//! Fault tolerance for calls to slow or unreliable dependencies: AI providers,
//! external APIs such as court e-filing services, and the database.
//!
//! ## Architecture
//!
//! - **Circuit Breakers**: isolate failing dependencies using a sliding window of
//!   recent outcomes and fail fast while open
//! - **Manager**: one breaker per named dependency, aggregated health
//! - **Retry Handler**: bounded exponential backoff gated by a caller predicate
//! - **Protected Dependency**: breaker + retry composed in either order
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lexdesk_core::resilience::{CircuitBreakerManager, CircuitBreakerOverrides};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = CircuitBreakerManager::new();
//! let breaker = manager.create_breaker(
//!     "ai_provider",
//!     CircuitBreakerOverrides::default().call_timeout(Duration::from_secs(90)),
//! )?;
//!
//! let summary = breaker
//!     .execute(|| async {
//!         // Call the AI provider here
//!         Ok::<_, std::io::Error>("summary")
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod circuit_breaker;
pub mod config;
pub mod errors;
pub mod manager;
pub mod metrics;
pub mod protected;
pub mod retry;

#[cfg(test)]
mod settings_config_test;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use config::{CircuitBreakerConfig, CircuitBreakerOverrides, GlobalCircuitBreakerSettings};
pub use errors::{CircuitBreakerError, ResilienceError};
pub use manager::CircuitBreakerManager;
pub use metrics::{BreakerHealth, CircuitBreakerMetrics, SystemCircuitBreakerMetrics};
pub use protected::ProtectedDependency;
pub use retry::{RetryConfig, RetryHandler};
