//! # Practice Core
//!
//! Wires the circuit breaker manager, policy service and command bus from an
//! [`AppConfig`] and registers the client-management handlers. Components are
//! owned here and handed out as `Arc`s; nothing is a process-wide singleton.

use crate::commands::CommandBus;
use crate::config::AppConfig;
use crate::error::Result;
use crate::policy::{PolicyCacheStats, PolicyService};
use crate::practice::{default_policies, register_client_handlers, ClientHandlerContext, ClientRepository};
use crate::resilience::{
    CircuitBreakerManager, ProtectedDependency, RetryHandler, SystemCircuitBreakerMetrics,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Component name of the breaker guarding the client store
pub const CLIENT_STORE_COMPONENT: &str = "database";

/// Point-in-time health of the core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub environment: String,
    pub healthy: bool,
    pub circuit_breakers: SystemCircuitBreakerMetrics,
    pub registered_commands: Vec<String>,
    pub policy_cache: PolicyCacheStats,
}

#[derive(Debug)]
pub struct PracticeCore {
    config: Arc<AppConfig>,
    breakers: Arc<CircuitBreakerManager>,
    policies: Arc<PolicyService>,
    bus: Arc<CommandBus>,
}

impl PracticeCore {
    /// Validate `config` and build every component
    pub fn start(config: AppConfig, repository: Arc<dyn ClientRepository>) -> Result<Self> {
        config.validate()?;

        let breakers = Arc::new(CircuitBreakerManager::from_settings(
            &config.circuit_breakers,
        )?);

        let policies = Arc::new(PolicyService::new());
        for policy in default_policies()
            .into_iter()
            .chain(config.policies.iter().cloned())
        {
            policies.register_policy(policy);
        }

        let store = ProtectedDependency::from_manager(
            &breakers,
            CLIENT_STORE_COMPONENT,
            RetryHandler::new(config.retry.to_retry_config()),
        )?;

        let bus = Arc::new(CommandBus::with_policy_service(policies.clone()));
        let context = ClientHandlerContext::new(repository, policies.clone(), store);
        register_client_handlers(&bus, &context);

        info!(
            environment = %config.environment,
            breakers = breakers.len(),
            policies = policies.policy_names().len(),
            handlers = bus.handler_count(),
            "🚀 Practice core started"
        );

        Ok(Self {
            config: Arc::new(config),
            breakers,
            policies,
            bus,
        })
    }

    pub fn config(&self) -> &Arc<AppConfig> {
        &self.config
    }

    pub fn command_bus(&self) -> &Arc<CommandBus> {
        &self.bus
    }

    pub fn policy_service(&self) -> &Arc<PolicyService> {
        &self.policies
    }

    pub fn circuit_breakers(&self) -> &Arc<CircuitBreakerManager> {
        &self.breakers
    }

    pub fn health_report(&self) -> HealthReport {
        let circuit_breakers = self.breakers.system_health();
        HealthReport {
            environment: self.config.environment.clone(),
            healthy: circuit_breakers.is_healthy(),
            circuit_breakers,
            registered_commands: self
                .bus
                .registered_command_types()
                .into_iter()
                .map(str::to_string)
                .collect(),
            policy_cache: self.policies.cache_stats(),
        }
    }

    /// Log final breaker metrics and drop handlers and cached verdicts
    pub fn shutdown(&self) {
        self.breakers.log_metrics_summary();
        self.bus.clear_handlers();
        self.policies.clear_cache();
        info!(environment = %self.config.environment, "🛑 Practice core shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice::InMemoryClientRepository;

    #[test]
    fn test_start_registers_client_handlers() {
        let core = PracticeCore::start(
            AppConfig::default(),
            Arc::new(InMemoryClientRepository::new()),
        )
        .unwrap();

        let report = core.health_report();
        assert!(report.healthy);
        assert_eq!(
            report.registered_commands,
            vec![
                "CreateClientCommand".to_string(),
                "DeleteClientCommand".to_string(),
                "UpdateClientCommand".to_string()
            ]
        );
        assert_eq!(report.circuit_breakers.total_breakers, 2);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["environment"], "development");
        assert_eq!(json["circuit_breakers"]["open"], 0);

        core.shutdown();
        assert_eq!(core.command_bus().handler_count(), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = AppConfig::default();
        config.environment = String::new();

        let result = PracticeCore::start(config, Arc::new(InMemoryClientRepository::new()));
        assert!(matches!(result, Err(crate::error::LexdeskError::Configuration(_))));
    }
}
