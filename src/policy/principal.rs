use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Permission that grants every other permission
pub const WILDCARD_PERMISSION: &str = "*";

/// Identity of an authenticated principal (attorney, paralegal, service account)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for PrincipalId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for PrincipalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// The authenticated actor on whose behalf a command runs.
///
/// Authorization only looks at the identifier, the role and the permission
/// list; how the principal was authenticated is the caller's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub role: String,
    pub permissions: Vec<String>,
}

impl Principal {
    pub fn new(id: PrincipalId, role: impl Into<String>) -> Self {
        Self {
            id,
            role: role.into(),
            permissions: Vec::new(),
        }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    /// True for an exact match or when the principal holds the wildcard
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .iter()
            .any(|held| held == permission || held == WILDCARD_PERMISSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_checks() {
        let paralegal = Principal::new(PrincipalId::new(), "paralegal")
            .with_permissions(["clients.read", "clients.write"]);

        assert!(paralegal.has_role("paralegal"));
        assert!(paralegal.has_permission("clients.write"));
        assert!(!paralegal.has_permission("clients.delete"));

        let admin = Principal::new(PrincipalId::new(), "admin").with_permissions(["*"]);
        assert!(admin.has_permission("clients.delete"));
    }

    #[test]
    fn test_principal_id_round_trips_through_string() {
        let id = PrincipalId::new();
        let parsed: PrincipalId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
