use crate::policy::PrincipalId;
use thiserror::Error;

/// Raised when a principal may not perform an action on a resource.
///
/// Carries enough context for audit logging by the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Principal {principal_id} ({role}) is not authorized to {action} {resource}: {reason}")]
pub struct AuthorizationError {
    pub principal_id: PrincipalId,
    pub role: String,
    pub action: String,
    pub resource: String,
    pub reason: String,
}
