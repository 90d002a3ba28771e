//! # Circuit Breaker Manager
//!
//! Registry owning one circuit breaker per named dependency. The manager is
//! constructed explicitly at application start and shared by reference with
//! whatever composes the command handlers.

use crate::config::CircuitBreakerSettings;
use crate::resilience::{
    BreakerHealth, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerOverrides,
    GlobalCircuitBreakerSettings, ResilienceError, SystemCircuitBreakerMetrics,
};
use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Named registry of circuit breakers
#[derive(Debug)]
pub struct CircuitBreakerManager {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    default_config: CircuitBreakerConfig,
    component_overrides: HashMap<String, CircuitBreakerOverrides>,
    settings: GlobalCircuitBreakerSettings,
}

impl CircuitBreakerManager {
    /// Create an empty manager using the documented breaker defaults
    pub fn new() -> Self {
        Self {
            breakers: DashMap::new(),
            default_config: CircuitBreakerConfig::default(),
            component_overrides: HashMap::new(),
            settings: GlobalCircuitBreakerSettings::default(),
        }
    }

    /// Create an empty manager with custom defaults
    pub fn with_defaults(
        default_config: CircuitBreakerConfig,
        settings: GlobalCircuitBreakerSettings,
    ) -> Result<Self, ResilienceError> {
        default_config.validate()?;
        Ok(Self {
            breakers: DashMap::new(),
            default_config,
            component_overrides: HashMap::new(),
            settings,
        })
    }

    /// Build a manager from loaded configuration, creating every configured component
    pub fn from_settings(settings: &CircuitBreakerSettings) -> Result<Self, ResilienceError> {
        let mut manager = Self::with_defaults(
            settings.default_config.to_breaker_config(),
            settings.global_settings.to_resilience_settings(),
        )?;

        for (name, component) in &settings.component_configs {
            manager
                .component_overrides
                .insert(name.clone(), component.to_breaker_config().into());
        }

        let mut names: Vec<String> = manager.component_overrides.keys().cloned().collect();
        names.sort();
        for name in names {
            let overrides = manager.component_overrides[&name].clone();
            manager.create_breaker(&name, overrides)?;
        }

        info!(
            breakers = manager.breakers.len(),
            auto_create = manager.settings.auto_create_enabled,
            "🛡️ Circuit breaker manager initialized from configuration"
        );

        Ok(manager)
    }

    pub fn default_config(&self) -> &CircuitBreakerConfig {
        &self.default_config
    }

    /// Create (or replace) the breaker for `name`, merging `overrides` onto the defaults
    pub fn create_breaker(
        &self,
        name: &str,
        overrides: CircuitBreakerOverrides,
    ) -> Result<Arc<CircuitBreaker>, ResilienceError> {
        let config = overrides.apply_to(&self.default_config);

        if !self.breakers.contains_key(name) && self.breakers.len() >= self.settings.max_breakers {
            return Err(ResilienceError::BreakerLimitReached {
                limit: self.settings.max_breakers,
            });
        }

        let breaker = Arc::new(CircuitBreaker::new(name, config)?);
        if self
            .breakers
            .insert(name.to_string(), breaker.clone())
            .is_some()
        {
            warn!(component = %name, "Circuit breaker replaced");
        }

        Ok(breaker)
    }

    /// Look up an existing breaker
    pub fn get_breaker(&self, name: &str) -> Result<Arc<CircuitBreaker>, ResilienceError> {
        self.breakers
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ResilienceError::BreakerNotFound {
                name: name.to_string(),
            })
    }

    /// Look up a breaker, creating it from configuration when auto-creation is enabled
    pub fn get_or_create(&self, name: &str) -> Result<Arc<CircuitBreaker>, ResilienceError> {
        if let Some(existing) = self.breakers.get(name) {
            return Ok(existing.value().clone());
        }

        if !self.settings.auto_create_enabled {
            return Err(ResilienceError::BreakerNotFound {
                name: name.to_string(),
            });
        }

        if self.breakers.len() >= self.settings.max_breakers {
            return Err(ResilienceError::BreakerLimitReached {
                limit: self.settings.max_breakers,
            });
        }

        let config = self
            .component_overrides
            .get(name)
            .map(|overrides| overrides.apply_to(&self.default_config))
            .unwrap_or_else(|| self.default_config.clone());

        let entry = self
            .breakers
            .entry(name.to_string())
            .or_try_insert_with(|| CircuitBreaker::new(name, config).map(Arc::new))?;

        debug!(component = %name, "Circuit breaker resolved via auto-creation");
        Ok(entry.value().clone())
    }

    /// Names of every registered breaker, sorted
    pub fn breaker_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.breakers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }

    fn snapshot(&self) -> Vec<(String, Arc<CircuitBreaker>)> {
        self.breakers
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Per-breaker state, health flag, failure rate and metrics
    pub fn get_health_status(&self) -> BTreeMap<String, BreakerHealth> {
        self.snapshot()
            .into_iter()
            .map(|(name, breaker)| {
                let health = BreakerHealth {
                    state: breaker.state(),
                    healthy: breaker.is_healthy(),
                    failure_rate: breaker.failure_rate(),
                    metrics: breaker.metrics(),
                };
                (name, health)
            })
            .collect()
    }

    /// Aggregate health across all breakers
    pub fn system_health(&self) -> SystemCircuitBreakerMetrics {
        SystemCircuitBreakerMetrics::from_health(self.get_health_status())
    }

    /// Force-close every breaker
    pub fn reset_all(&self) {
        let breakers = self.snapshot();
        warn!(breakers = breakers.len(), "🚨 Resetting all circuit breakers");
        for (_, breaker) in breakers {
            breaker.force_close();
        }
    }

    /// Emit one summary line per breaker
    pub fn log_metrics_summary(&self) {
        for (name, breaker) in self.snapshot() {
            info!(
                component = %name,
                summary = %breaker.metrics().format_summary(),
                "📊 Circuit breaker metrics"
            );
        }
    }
}

impl Default for CircuitBreakerManager {
    fn default() -> Self {
        Self::new()
    }
}
