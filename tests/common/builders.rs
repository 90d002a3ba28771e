use lexdesk_core::commands::CommandMetadata;
use lexdesk_core::policy::{Principal, PrincipalId};
use lexdesk_core::practice::{ClientId, CreateClientCommand, DeleteClientCommand};
use lexdesk_core::resilience::{CircuitBreakerConfig, RetryConfig};
use std::time::Duration;

pub fn attorney() -> Principal {
    Principal::new(PrincipalId::new(), "attorney").with_permissions([
        "clients.read",
        "clients.write",
        "clients.delete",
    ])
}

pub fn paralegal() -> Principal {
    Principal::new(PrincipalId::new(), "paralegal")
        .with_permissions(["clients.read", "clients.write"])
}

pub fn receptionist() -> Principal {
    Principal::new(PrincipalId::new(), "receptionist").with_permissions(["clients.read"])
}

pub fn create_client(principal: Principal, name: &str) -> CreateClientCommand {
    CreateClientCommand {
        metadata: CommandMetadata::new(principal),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        practice_area: Some("litigation".to_string()),
    }
}

pub fn delete_client(principal: Principal, client_id: ClientId) -> DeleteClientCommand {
    DeleteClientCommand {
        metadata: CommandMetadata::new(principal),
        client_id,
    }
}

/// Breaker configuration that trips quickly and recovers after one second
pub fn fast_breaker_config(minimum_requests: u32, success_threshold: u32) -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        failure_threshold: 0.5,
        recovery_timeout: Duration::from_secs(1),
        monitoring_window: Duration::from_secs(60),
        minimum_requests,
        success_threshold,
        call_timeout: Duration::from_secs(5),
    }
}

pub fn quick_retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(80),
        backoff_multiplier: 2.0,
    }
}
