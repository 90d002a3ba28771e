use crate::policy::{Principal, PrincipalId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier assigned to each command instance
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(Uuid);

impl CommandId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Identity and provenance shared by every command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandMetadata {
    pub command_id: CommandId,
    /// The principal on whose behalf the command runs
    pub principal: Principal,
    pub issued_at: DateTime<Utc>,
}

impl CommandMetadata {
    pub fn new(principal: Principal) -> Self {
        Self {
            command_id: CommandId::new(),
            principal,
            issued_at: Utc::now(),
        }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal.id
    }
}

/// An immutable request for one state change.
///
/// The type itself is the dispatch key: each command type has at most one
/// handler registered on a [`crate::commands::CommandBus`].
pub trait Command: Send + Sync + 'static {
    /// Result returned by the command's handler
    type Output: Send + 'static;

    fn metadata(&self) -> &CommandMetadata;

    /// Short type name used for policy lookup and logging (`CreateClientCommand`)
    fn command_type() -> &'static str
    where
        Self: Sized,
    {
        short_type_name::<Self>()
    }
}

/// `lexdesk_core::practice::CreateClientCommand` → `CreateClientCommand`
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ArchiveMatterCommand {
        metadata: CommandMetadata,
    }

    impl Command for ArchiveMatterCommand {
        type Output = ();

        fn metadata(&self) -> &CommandMetadata {
            &self.metadata
        }
    }

    #[test]
    fn test_command_type_is_short_name() {
        assert_eq!(ArchiveMatterCommand::command_type(), "ArchiveMatterCommand");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
    }

    #[test]
    fn test_metadata_assigns_fresh_ids() {
        let principal = Principal::new(PrincipalId::new(), "attorney");
        let first = ArchiveMatterCommand {
            metadata: CommandMetadata::new(principal.clone()),
        };
        let second = CommandMetadata::new(principal.clone());

        assert_ne!(first.metadata().command_id, second.command_id);
        assert_eq!(first.metadata().principal_id(), principal.id);
    }
}
