//! Client records and the commands that change them

use crate::commands::{Command, CommandMetadata};
use crate::policy::PrincipalId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A client of the practice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub email: String,
    pub practice_area: Option<String>,
    pub created_by: PrincipalId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateClientCommand {
    pub metadata: CommandMetadata,
    pub name: String,
    pub email: String,
    pub practice_area: Option<String>,
}

impl Command for CreateClientCommand {
    type Output = Client;

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone)]
pub struct UpdateClientCommand {
    pub metadata: CommandMetadata,
    pub client_id: ClientId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub practice_area: Option<String>,
}

impl Command for UpdateClientCommand {
    type Output = Client;

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }
}

#[derive(Debug, Clone)]
pub struct DeleteClientCommand {
    pub metadata: CommandMetadata,
    pub client_id: ClientId,
}

impl Command for DeleteClientCommand {
    type Output = ();

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }
}

pub(crate) fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("client name must not be empty".to_string());
    }
    Ok(())
}

pub(crate) fn validate_email(email: &str) -> Result<(), String> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(format!("'{email}' is not a valid email address")),
    }
}
