//! Manager construction from loaded application configuration

use crate::config::{AppConfig, CircuitBreakerComponentConfig};
use crate::resilience::{CircuitBreakerManager, CircuitState, ResilienceError};
use std::time::Duration;

#[test]
fn test_manager_creates_configured_components() {
    let config = AppConfig::default();
    let manager = CircuitBreakerManager::from_settings(&config.circuit_breakers).unwrap();

    assert_eq!(
        manager.breaker_names(),
        vec!["ai_provider".to_string(), "database".to_string()]
    );

    let ai = manager.get_breaker("ai_provider").unwrap();
    assert_eq!(ai.config().call_timeout, Duration::from_secs(90));
    assert_eq!(ai.config().minimum_requests, 5);
    assert_eq!(ai.state(), CircuitState::Closed);

    let database = manager.get_breaker("database").unwrap();
    assert_eq!(database.config().recovery_timeout, Duration::from_secs(30));
}

#[test]
fn test_auto_created_breakers_use_default_config() {
    let mut config = AppConfig::default();
    config.circuit_breakers.default_config = CircuitBreakerComponentConfig {
        failure_threshold: 0.75,
        minimum_requests: 20,
        ..CircuitBreakerComponentConfig::default()
    };

    let manager = CircuitBreakerManager::from_settings(&config.circuit_breakers).unwrap();
    let breaker = manager.get_or_create("document_storage").unwrap();

    assert_eq!(breaker.config().failure_threshold, 0.75);
    assert_eq!(breaker.config().minimum_requests, 20);
    assert_eq!(manager.len(), 3);
}

#[test]
fn test_auto_creation_can_be_disabled() {
    let mut config = AppConfig::default();
    config.circuit_breakers.global_settings.auto_create_enabled = false;

    let manager = CircuitBreakerManager::from_settings(&config.circuit_breakers).unwrap();

    assert!(manager.get_or_create("database").is_ok());
    assert_eq!(
        manager.get_or_create("document_storage").unwrap_err(),
        ResilienceError::BreakerNotFound {
            name: "document_storage".to_string()
        }
    );
}

#[test]
fn test_invalid_component_config_is_rejected() {
    let mut config = AppConfig::default();
    config.circuit_breakers.component_configs.insert(
        "broken".to_string(),
        CircuitBreakerComponentConfig {
            success_threshold: 0,
            ..CircuitBreakerComponentConfig::default()
        },
    );

    assert!(matches!(
        CircuitBreakerManager::from_settings(&config.circuit_breakers),
        Err(ResilienceError::InvalidConfiguration { .. })
    ));
}
