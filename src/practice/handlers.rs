//! Client-management handlers.
//!
//! Each handler checks the principal against the policy service, validates
//! input, then reaches the repository through a protected dependency so
//! transient store outages are retried and a failing store trips its breaker.

use crate::commands::{Command, CommandError, CommandHandler};
use crate::logging::log_dependency_operation;
use crate::policy::PolicyService;
use crate::practice::clients::{validate_email, validate_name};
use crate::practice::{
    Client, ClientId, ClientRepository, CreateClientCommand, DeleteClientCommand,
    RepositoryError, UpdateClientCommand,
};
use crate::resilience::{CircuitBreakerError, ProtectedDependency};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::info;

pub const CLIENT_RESOURCE: &str = "client";

/// Collaborators shared by the client handlers
#[derive(Clone)]
pub struct ClientHandlerContext {
    pub repository: Arc<dyn ClientRepository>,
    pub policies: Arc<PolicyService>,
    pub store: ProtectedDependency,
}

impl ClientHandlerContext {
    pub fn new(
        repository: Arc<dyn ClientRepository>,
        policies: Arc<PolicyService>,
        store: ProtectedDependency,
    ) -> Self {
        Self {
            repository,
            policies,
            store,
        }
    }

    fn authorize<C: Command>(&self, command: &C, action: &str) -> Result<(), CommandError> {
        self.policies
            .authorize(&command.metadata().principal, action, CLIENT_RESOURCE)?;
        Ok(())
    }

    async fn load(&self, id: ClientId) -> Result<Client, CommandError> {
        let repository = &self.repository;
        let found = self
            .guarded("get", || async move { repository.get(id).await })
            .await?;
        found.ok_or_else(|| CommandError::NotFound {
            entity: "client",
            id: id.to_string(),
        })
    }

    /// Run one store operation with retries inside a single breaker call
    async fn guarded<F, Fut, T>(&self, operation: &str, call: F) -> Result<T, CommandError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, RepositoryError>>,
    {
        let started = Instant::now();
        let result = self
            .store
            .call_retry_inside(call, RepositoryError::is_transient)
            .await;

        let (status, details) = match &result {
            Ok(_) => ("succeeded", None),
            Err(CircuitBreakerError::CircuitOpen { .. }) => ("rejected", None),
            Err(error) => ("failed", Some(error.to_string())),
        };
        log_dependency_operation(
            operation,
            self.store.component_name(),
            status,
            Some(started.elapsed().as_millis() as u64),
            details.as_deref(),
        );

        result.map_err(CommandError::from)
    }
}

pub struct CreateClientHandler {
    context: ClientHandlerContext,
}

impl CreateClientHandler {
    pub fn new(context: ClientHandlerContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl CommandHandler<CreateClientCommand> for CreateClientHandler {
    async fn execute(&self, command: &CreateClientCommand) -> Result<Client, CommandError> {
        self.context.authorize(command, "create")?;
        validate_name(&command.name).map_err(CommandError::Validation)?;
        validate_email(&command.email).map_err(CommandError::Validation)?;

        let now = Utc::now();
        let client = Client {
            id: ClientId::new(),
            name: command.name.trim().to_string(),
            email: command.email.trim().to_lowercase(),
            practice_area: command.practice_area.clone(),
            created_by: command.metadata.principal_id(),
            created_at: now,
            updated_at: now,
        };

        let repository = &self.context.repository;
        let inserted = self
            .context
            .guarded("insert", || {
                let client = client.clone();
                async move { repository.insert(client).await }
            })
            .await?;
        if !inserted {
            return Err(CommandError::Validation(format!(
                "client {} already exists",
                client.id
            )));
        }

        info!(
            client_id = %client.id,
            principal_id = %client.created_by,
            "👤 Client created"
        );
        Ok(client)
    }
}

pub struct UpdateClientHandler {
    context: ClientHandlerContext,
}

impl UpdateClientHandler {
    pub fn new(context: ClientHandlerContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl CommandHandler<UpdateClientCommand> for UpdateClientHandler {
    async fn execute(&self, command: &UpdateClientCommand) -> Result<Client, CommandError> {
        self.context.authorize(command, "update")?;
        if let Some(name) = &command.name {
            validate_name(name).map_err(CommandError::Validation)?;
        }
        if let Some(email) = &command.email {
            validate_email(email).map_err(CommandError::Validation)?;
        }

        let mut client = self.context.load(command.client_id).await?;
        if let Some(name) = &command.name {
            client.name = name.trim().to_string();
        }
        if let Some(email) = &command.email {
            client.email = email.trim().to_lowercase();
        }
        if command.practice_area.is_some() {
            client.practice_area = command.practice_area.clone();
        }
        client.updated_at = Utc::now();

        let repository = &self.context.repository;
        let updated = self
            .context
            .guarded("update", || {
                let client = client.clone();
                async move { repository.update(client).await }
            })
            .await?;
        if !updated {
            return Err(CommandError::NotFound {
                entity: "client",
                id: command.client_id.to_string(),
            });
        }

        info!(client_id = %client.id, "✏️ Client updated");
        Ok(client)
    }
}

pub struct DeleteClientHandler {
    context: ClientHandlerContext,
}

impl DeleteClientHandler {
    pub fn new(context: ClientHandlerContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl CommandHandler<DeleteClientCommand> for DeleteClientHandler {
    async fn execute(&self, command: &DeleteClientCommand) -> Result<(), CommandError> {
        self.context.authorize(command, "delete")?;

        let repository = &self.context.repository;
        let id = command.client_id;
        let deleted = self
            .context
            .guarded("delete", || async move { repository.delete(id).await })
            .await?;
        if !deleted {
            return Err(CommandError::NotFound {
                entity: "client",
                id: id.to_string(),
            });
        }

        info!(client_id = %id, "🗑️ Client deleted");
        Ok(())
    }
}
