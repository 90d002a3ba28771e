//! # Configuration
//!
//! Typed application configuration loaded from `config/lexdesk.toml`, an
//! optional `config/lexdesk.<environment>.toml` overlay and `LEXDESK__*`
//! environment variables (highest precedence).
//!
//! ```rust,no_run
//! use lexdesk_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let config = manager.config();
//! println!("environment: {}", config.environment);
//! # Ok(())
//! # }
//! ```

mod error;
pub mod loader;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

use crate::policy::Policy;
use crate::resilience::{CircuitBreakerConfig, GlobalCircuitBreakerSettings, RetryConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: String,
    pub circuit_breakers: CircuitBreakerSettings,
    pub retry: RetrySettings,
    /// Policies registered on top of the built-in practice policies
    pub policies: Vec<Policy>,
}

/// Circuit breaker section
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerSettings {
    /// Global circuit breaker settings
    pub global_settings: CircuitBreakerGlobalSettings,

    /// Configuration for breakers without a component entry
    pub default_config: CircuitBreakerComponentConfig,

    /// Specific configurations for named components
    pub component_configs: HashMap<String, CircuitBreakerComponentConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerGlobalSettings {
    /// Maximum number of circuit breakers allowed
    pub max_circuit_breakers: usize,

    /// Whether unknown components get a breaker on first lookup
    pub auto_create_enabled: bool,
}

/// Circuit breaker configuration for one component
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerComponentConfig {
    /// Failure ratio (0.0..=1.0) that opens the circuit
    pub failure_threshold: f64,
    pub recovery_timeout_seconds: u64,
    pub monitoring_window_seconds: u64,
    pub minimum_requests: u32,
    pub success_threshold: u32,
    pub call_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl CircuitBreakerSettings {
    /// Get configuration for a specific component
    pub fn config_for_component(&self, component_name: &str) -> &CircuitBreakerComponentConfig {
        self.component_configs
            .get(component_name)
            .unwrap_or(&self.default_config)
    }
}

impl CircuitBreakerComponentConfig {
    /// Convert to the resilience module's format
    pub fn to_breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            recovery_timeout: Duration::from_secs(self.recovery_timeout_seconds),
            monitoring_window: Duration::from_secs(self.monitoring_window_seconds),
            minimum_requests: self.minimum_requests,
            success_threshold: self.success_threshold,
            call_timeout: Duration::from_millis(self.call_timeout_ms),
        }
    }

    fn validate(&self, context: &str) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.failure_threshold) || self.failure_threshold == 0.0 {
            return Err(ConfigurationError::invalid_value(
                format!("{context}.failure_threshold"),
                self.failure_threshold,
                "must be greater than 0.0 and at most 1.0",
            ));
        }
        for (field, value) in [
            ("recovery_timeout_seconds", self.recovery_timeout_seconds),
            ("monitoring_window_seconds", self.monitoring_window_seconds),
            ("minimum_requests", u64::from(self.minimum_requests)),
            ("success_threshold", u64::from(self.success_threshold)),
            ("call_timeout_ms", self.call_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigurationError::invalid_value(
                    format!("{context}.{field}"),
                    value,
                    "must be greater than 0",
                ));
            }
        }
        Ok(())
    }
}

impl CircuitBreakerGlobalSettings {
    /// Convert to the resilience module's format
    pub fn to_resilience_settings(&self) -> GlobalCircuitBreakerSettings {
        GlobalCircuitBreakerSettings {
            max_breakers: self.max_circuit_breakers,
            auto_create_enabled: self.auto_create_enabled,
        }
    }
}

impl RetrySettings {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            circuit_breakers: CircuitBreakerSettings::default(),
            retry: RetrySettings::default(),
            policies: Vec::new(),
        }
    }
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        let mut component_configs = HashMap::new();
        component_configs.insert(
            "database".to_string(),
            CircuitBreakerComponentConfig {
                recovery_timeout_seconds: 30,
                call_timeout_ms: 5_000,
                ..CircuitBreakerComponentConfig::default()
            },
        );
        component_configs.insert(
            "ai_provider".to_string(),
            CircuitBreakerComponentConfig {
                minimum_requests: 5,
                recovery_timeout_seconds: 120,
                call_timeout_ms: 90_000,
                ..CircuitBreakerComponentConfig::default()
            },
        );

        Self {
            global_settings: CircuitBreakerGlobalSettings::default(),
            default_config: CircuitBreakerComponentConfig::default(),
            component_configs,
        }
    }
}

impl Default for CircuitBreakerGlobalSettings {
    fn default() -> Self {
        let settings = GlobalCircuitBreakerSettings::default();
        Self {
            max_circuit_breakers: settings.max_breakers,
            auto_create_enabled: settings.auto_create_enabled,
        }
    }
}

impl Default for CircuitBreakerComponentConfig {
    fn default() -> Self {
        let config = CircuitBreakerConfig::default();
        Self {
            failure_threshold: config.failure_threshold,
            recovery_timeout_seconds: config.recovery_timeout.as_secs(),
            monitoring_window_seconds: config.monitoring_window.as_secs(),
            minimum_requests: config.minimum_requests,
            success_threshold: config.success_threshold,
            call_timeout_ms: config.call_timeout.as_millis() as u64,
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        let config = RetryConfig::default();
        Self {
            max_retries: config.max_retries,
            base_delay_ms: config.base_delay.as_millis() as u64,
            max_delay_ms: config.max_delay.as_millis() as u64,
            backoff_multiplier: config.backoff_multiplier,
        }
    }
}

impl AppConfig {
    /// Validate configuration consistency
    pub fn validate(&self) -> ConfigResult<()> {
        if self.environment.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "environment",
                "application configuration",
            ));
        }

        let breakers = &self.circuit_breakers;
        breakers
            .default_config
            .validate("circuit_breakers.default_config")?;
        for (name, component) in &breakers.component_configs {
            component.validate(&format!("circuit_breakers.component_configs.{name}"))?;
        }

        if breakers.global_settings.max_circuit_breakers < breakers.component_configs.len() {
            return Err(ConfigurationError::invalid_value(
                "circuit_breakers.global_settings.max_circuit_breakers",
                breakers.global_settings.max_circuit_breakers,
                format!(
                    "must allow at least the {} configured components",
                    breakers.component_configs.len()
                ),
            ));
        }

        if self.retry.backoff_multiplier < 1.0 {
            return Err(ConfigurationError::invalid_value(
                "retry.backoff_multiplier",
                self.retry.backoff_multiplier,
                "must be at least 1.0",
            ));
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(ConfigurationError::invalid_value(
                "retry.max_delay_ms",
                self.retry.max_delay_ms,
                "must not be smaller than retry.base_delay_ms",
            ));
        }

        for policy in &self.policies {
            if policy.name.trim().is_empty() {
                return Err(ConfigurationError::missing_required_field(
                    "name",
                    "policies entry",
                ));
            }
            for rule in &policy.rules {
                if rule.resource.is_empty() || rule.action.is_empty() {
                    return Err(ConfigurationError::missing_required_field(
                        "resource/action",
                        format!("policy '{}'", policy.name),
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn is_test_environment(&self) -> bool {
        self.environment == "test"
    }

    pub fn is_production_environment(&self) -> bool {
        self.environment == "production"
    }
}
