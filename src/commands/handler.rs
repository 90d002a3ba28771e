use crate::commands::{Command, CommandError};
use async_trait::async_trait;

/// Business logic bound to exactly one command type
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn execute(&self, command: &C) -> Result<C::Output, CommandError>;
}
