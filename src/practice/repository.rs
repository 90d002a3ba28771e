//! Client persistence boundary

use crate::practice::{Client, ClientId};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

/// Infrastructure failures only; absent records are `Ok(None)` / `Ok(false)`
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Client store unavailable: {0}")]
    Unavailable(String),

    #[error("Client store rejected the write: {0}")]
    Storage(String),
}

impl RepositoryError {
    /// Worth retrying after a short delay
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Insert a new client; `false` when the id is already taken
    async fn insert(&self, client: Client) -> Result<bool, RepositoryError>;

    async fn get(&self, id: ClientId) -> Result<Option<Client>, RepositoryError>;

    /// Replace an existing client; `false` when it does not exist
    async fn update(&self, client: Client) -> Result<bool, RepositoryError>;

    /// `false` when nothing was deleted
    async fn delete(&self, id: ClientId) -> Result<bool, RepositoryError>;
}

/// In-process store with injectable outages for exercising the breaker
#[derive(Debug, Default)]
pub struct InMemoryClientRepository {
    clients: DashMap<ClientId, Client>,
    /// Number of upcoming calls that fail with `Unavailable`
    pending_outages: AtomicU32,
}

impl InMemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `calls` operations fail as if the store were down
    pub fn fail_next(&self, calls: u32) {
        self.pending_outages.store(calls, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        let outage = self
            .pending_outages
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match outage {
            Ok(_) => Err(RepositoryError::Unavailable(
                "connection refused".to_string(),
            )),
            Err(_) => Ok(()),
        }
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn insert(&self, client: Client) -> Result<bool, RepositoryError> {
        self.check_available()?;
        match self.clients.entry(client.id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Ok(false),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(client);
                Ok(true)
            }
        }
    }

    async fn get(&self, id: ClientId) -> Result<Option<Client>, RepositoryError> {
        self.check_available()?;
        Ok(self.clients.get(&id).map(|entry| entry.value().clone()))
    }

    async fn update(&self, client: Client) -> Result<bool, RepositoryError> {
        self.check_available()?;
        match self.clients.get_mut(&client.id) {
            Some(mut existing) => {
                *existing = client;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ClientId) -> Result<bool, RepositoryError> {
        self.check_available()?;
        Ok(self.clients.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PrincipalId;
    use chrono::Utc;

    fn client() -> Client {
        Client {
            id: ClientId::new(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            practice_area: None,
            created_by: PrincipalId::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let repository = InMemoryClientRepository::new();
        let client = client();

        assert!(repository.insert(client.clone()).await.unwrap());
        assert!(!repository.insert(client.clone()).await.unwrap());
        assert_eq!(repository.get(client.id).await.unwrap(), Some(client.clone()));

        let mut renamed = client.clone();
        renamed.name = "Ada King".to_string();
        assert!(repository.update(renamed).await.unwrap());
        assert_eq!(
            repository.get(client.id).await.unwrap().unwrap().name,
            "Ada King"
        );

        assert!(repository.delete(client.id).await.unwrap());
        assert!(!repository.delete(client.id).await.unwrap());
        assert!(repository.is_empty());
    }

    #[tokio::test]
    async fn test_injected_outages_are_consumed() {
        let repository = InMemoryClientRepository::new();
        repository.fail_next(2);

        let id = ClientId::new();
        assert!(repository.get(id).await.unwrap_err().is_transient());
        assert!(repository.get(id).await.is_err());
        assert_eq!(repository.get(id).await.unwrap(), None);
    }
}
