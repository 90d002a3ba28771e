#![allow(clippy::doc_markdown)] // Allow technical terms in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Lexdesk Core
//!
//! Command dispatch, authorization and fault tolerance for the Lexdesk legal
//! practice platform.
//!
//! ## Overview
//!
//! Every state change in the practice (creating a client, updating a matter,
//! generating a document) is expressed as a typed command and routed through a
//! single bus to exactly one handler. Handlers check the caller against
//! role/permission policies and reach slow or unreliable dependencies (AI
//! providers, court e-filing APIs, the database) through circuit breakers and
//! bounded retries.
//!
//! ## Module Organization
//!
//! - [`commands`] - Command bus, command and handler traits
//! - [`policy`] - Principals, policies and the cached policy service
//! - [`resilience`] - Circuit breakers, manager, retry handler
//! - [`practice`] - Client-management commands and handlers
//! - [`bootstrap`] - Wiring everything from configuration
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lexdesk_core::bootstrap::PracticeCore;
//! use lexdesk_core::commands::CommandMetadata;
//! use lexdesk_core::config::ConfigManager;
//! use lexdesk_core::policy::{Principal, PrincipalId};
//! use lexdesk_core::practice::{CreateClientCommand, InMemoryClientRepository};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! lexdesk_core::logging::init_structured_logging();
//!
//! let config = ConfigManager::load()?.config().clone();
//! let core = PracticeCore::start(config, Arc::new(InMemoryClientRepository::new()))?;
//!
//! let attorney = Principal::new(PrincipalId::new(), "attorney")
//!     .with_permissions(["clients.write"]);
//! let client = core
//!     .command_bus()
//!     .execute_authorized(CreateClientCommand {
//!         metadata: CommandMetadata::new(attorney),
//!         name: "Ada Lovelace".to_string(),
//!         email: "ada@example.com".to_string(),
//!         practice_area: Some("estate".to_string()),
//!     })
//!     .await?;
//!
//! println!("created client {}", client.id);
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod policy;
pub mod practice;
pub mod resilience;

pub use bootstrap::{HealthReport, PracticeCore};
pub use commands::{Command, CommandBus, CommandError, CommandHandler, CommandMetadata};
pub use crate::config::{AppConfig, ConfigManager, ConfigurationError};
pub use error::{LexdeskError, Result};
pub use policy::{AuthorizationError, Policy, PolicyRule, PolicyService, Principal, PrincipalId};
pub use resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerManager,
    CircuitState, ResilienceError, RetryConfig, RetryHandler,
};
