//! # Command Bus
//!
//! Routes each command to the single handler registered for its type. The
//! registry is keyed by [`TypeId`]; handlers are cloned out of the lock before
//! they are awaited so a slow handler never blocks registration or lookup.

use crate::commands::{Command, CommandError, CommandHandler};
use crate::logging::log_command_operation;
use crate::policy::PolicyService;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

struct Registration {
    command_type: &'static str,
    /// Holds an `Arc<dyn CommandHandler<C>>` for the keyed command type
    handler: Box<dyn Any + Send + Sync>,
}

pub struct CommandBus {
    handlers: RwLock<HashMap<TypeId, Registration>>,
    policy: Option<Arc<PolicyService>>,
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = self.handlers.read();
        let mut command_types: Vec<&str> = handlers.values().map(|r| r.command_type).collect();
        command_types.sort_unstable();
        f.debug_struct("CommandBus")
            .field("command_types", &command_types)
            .field("policy", &self.policy.is_some())
            .finish()
    }
}

impl CommandBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            policy: None,
        }
    }

    /// Bus whose [`CommandBus::execute_authorized`] consults `policy`
    pub fn with_policy_service(policy: Arc<PolicyService>) -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            policy: Some(policy),
        }
    }

    /// Bind `handler` to command type `C`, replacing any previous handler
    pub fn register<C, H>(&self, handler: H)
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        self.register_arc::<C>(Arc::new(handler));
    }

    pub fn register_arc<C: Command>(&self, handler: Arc<dyn CommandHandler<C>>) {
        let command_type = C::command_type();
        let previous = self.handlers.write().insert(
            TypeId::of::<C>(),
            Registration {
                command_type,
                handler: Box::new(handler),
            },
        );

        if previous.is_some() {
            warn!(command_type = %command_type, "Command handler replaced");
        } else {
            info!(command_type = %command_type, "📮 Command handler registered");
        }
    }

    /// Dispatch `command` to its handler and return the handler's result unchanged
    pub async fn execute<C: Command>(&self, command: C) -> Result<C::Output, CommandError> {
        let handler = self.resolve::<C>()?;
        self.dispatch(handler, command).await
    }

    /// Dispatch after a cached policy check for the command's principal
    pub async fn execute_authorized<C: Command>(
        &self,
        command: C,
    ) -> Result<C::Output, CommandError> {
        let policy = self
            .policy
            .as_ref()
            .ok_or(CommandError::PolicyServiceMissing)?;
        let handler = self.resolve::<C>()?;

        policy.ensure_can_execute(C::command_type(), &command.metadata().principal)?;

        self.dispatch(handler, command).await
    }

    pub fn has_handler<C: Command>(&self) -> bool {
        self.handlers.read().contains_key(&TypeId::of::<C>())
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Short type names of every registered command, sorted
    pub fn registered_command_types(&self) -> Vec<&'static str> {
        let mut types: Vec<&'static str> = self
            .handlers
            .read()
            .values()
            .map(|r| r.command_type)
            .collect();
        types.sort_unstable();
        types
    }

    /// Drop every registration
    pub fn clear_handlers(&self) {
        let cleared = {
            let mut handlers = self.handlers.write();
            let count = handlers.len();
            handlers.clear();
            count
        };
        info!(handlers = cleared, "Command handlers cleared");
    }

    fn resolve<C: Command>(&self) -> Result<Arc<dyn CommandHandler<C>>, CommandError> {
        self.handlers
            .read()
            .get(&TypeId::of::<C>())
            .and_then(|registration| {
                registration
                    .handler
                    .downcast_ref::<Arc<dyn CommandHandler<C>>>()
                    .cloned()
            })
            .ok_or_else(|| {
                warn!(command_type = %C::command_type(), "No handler registered for command");
                CommandError::HandlerNotFound {
                    command_type: C::command_type(),
                }
            })
    }

    async fn dispatch<C: Command>(
        &self,
        handler: Arc<dyn CommandHandler<C>>,
        command: C,
    ) -> Result<C::Output, CommandError> {
        let metadata = command.metadata();
        debug!(
            command_type = %C::command_type(),
            command_id = %metadata.command_id,
            principal_id = %metadata.principal.id,
            "📨 Dispatching command"
        );

        let result = handler.execute(&command).await;

        let status = if result.is_ok() { "succeeded" } else { "failed" };
        log_command_operation(
            C::command_type(),
            &command.metadata().command_id.to_string(),
            &command.metadata().principal.id.to_string(),
            status,
            result.as_ref().err().map(|e| e.to_string()).as_deref(),
        );
        result
    }
}
