//! # Policy Module
//!
//! Role and permission based authorization for command dispatch. Policies are
//! named rule sets; a rule grants an action on a resource to principals whose
//! role and permissions satisfy its conditions. Anything not granted is denied.

pub mod errors;
pub mod evaluator;
pub mod principal;
pub mod rules;
pub mod service;

pub use errors::AuthorizationError;
pub use evaluator::{RoleBasedEvaluator, RuleEvaluator};
pub use principal::{Principal, PrincipalId, WILDCARD_PERMISSION};
pub use rules::{CommandTarget, Policy, PolicyRule, RuleConditions, WILDCARD};
pub use service::{AuthorizationDecision, PolicyCacheStats, PolicyService};
