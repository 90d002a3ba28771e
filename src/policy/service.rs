//! # Policy Service
//!
//! Evaluates whether a principal may perform an action on a resource. Verdicts
//! for command dispatch are cached per (principal, command type name) and only
//! dropped by [`PolicyService::clear_cache`]; a permission change for a
//! principal is not visible to cached entries until the cache is cleared.

use crate::policy::{
    AuthorizationError, CommandTarget, Policy, PolicyRule, Principal, PrincipalId,
    RoleBasedEvaluator, RuleEvaluator,
};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    principal_id: PrincipalId,
    command_type: String,
}

/// Outcome of an authorization check with the reasoning behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationDecision {
    pub granted: bool,
    pub principal_id: PrincipalId,
    pub action: String,
    pub resource: String,
    /// Policy holding the first satisfied rule
    pub matched_policy: Option<String>,
    pub matched_rule: Option<PolicyRule>,
    /// Rules whose resource and action matched, satisfied or not
    pub applicable_rules: usize,
    pub reason: String,
}

/// Statistics about the verdict cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
pub struct PolicyService {
    /// Keyed by name, ordered so the first matching policy is deterministic
    policies: RwLock<BTreeMap<String, Policy>>,
    command_targets: RwLock<HashMap<String, CommandTarget>>,
    cache: DashMap<CacheKey, bool>,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    evaluator: Arc<dyn RuleEvaluator>,
}

impl Default for PolicyService {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyService {
    pub fn new() -> Self {
        Self::with_evaluator(Arc::new(RoleBasedEvaluator))
    }

    pub fn with_evaluator(evaluator: Arc<dyn RuleEvaluator>) -> Self {
        Self {
            policies: RwLock::new(BTreeMap::new()),
            command_targets: RwLock::new(HashMap::new()),
            cache: DashMap::new(),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            evaluator,
        }
    }

    /// Add a named rule set; a policy with the same name is replaced
    pub fn register_policy(&self, policy: Policy) {
        let name = policy.name.clone();
        let rules = policy.rules.len();
        if self.policies.write().insert(name.clone(), policy).is_some() {
            warn!(policy = %name, "Policy replaced");
        }
        info!(policy = %name, rules = rules, "📜 Policy registered");
    }

    pub fn policy_names(&self) -> Vec<String> {
        self.policies.read().keys().cloned().collect()
    }

    /// Override the derived (resource, action) pair for a command type
    pub fn map_command(
        &self,
        command_type: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) {
        let command_type = command_type.into();
        let target = CommandTarget::new(resource, action);
        debug!(
            command_type = %command_type,
            resource = %target.resource,
            action = %target.action,
            "Command target mapped"
        );
        self.command_targets.write().insert(command_type, target);
    }

    /// Resolve the (resource, action) a command type is authorized against
    pub fn command_target(&self, command_type: &str) -> CommandTarget {
        if let Some(target) = self.command_targets.read().get(command_type) {
            return target.clone();
        }
        CommandTarget::from_command_name(command_type)
    }

    /// Cached verdict for dispatching `command_type` on behalf of `principal`
    pub fn can_execute(
        &self,
        principal_id: &PrincipalId,
        command_type: &str,
        principal: &Principal,
    ) -> bool {
        let key = CacheKey {
            principal_id: *principal_id,
            command_type: command_type.to_string(),
        };

        let cached = self.cache.get(&key).map(|entry| *entry.value());
        if let Some(verdict) = cached {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!(
                principal_id = %principal_id,
                command_type = %command_type,
                verdict = verdict,
                "Policy cache hit"
            );
            return verdict;
        }

        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        let target = self.command_target(command_type);
        let verdict = self
            .first_satisfied(principal, &target.action, &target.resource)
            .granted;

        self.cache.insert(key, verdict);
        verdict
    }

    /// Cached check for command dispatch, with audit context on denial
    pub fn ensure_can_execute(
        &self,
        command_type: &str,
        principal: &Principal,
    ) -> Result<(), AuthorizationError> {
        if self.can_execute(&principal.id, command_type, principal) {
            return Ok(());
        }

        let target = self.command_target(command_type);
        warn!(
            principal_id = %principal.id,
            role = %principal.role,
            command_type = %command_type,
            "🚫 Command dispatch denied by policy"
        );
        Err(AuthorizationError {
            principal_id: principal.id,
            role: principal.role.clone(),
            action: target.action,
            resource: target.resource,
            reason: format!("no policy permits {command_type}"),
        })
    }

    /// Uncached authorization of `action` on `resource`
    pub fn authorize(
        &self,
        principal: &Principal,
        action: &str,
        resource: &str,
    ) -> Result<(), AuthorizationError> {
        let decision = self.explain(principal, action, resource);
        if decision.granted {
            return Ok(());
        }

        warn!(
            principal_id = %principal.id,
            role = %principal.role,
            action = %action,
            resource = %resource,
            reason = %decision.reason,
            "🚫 Authorization denied"
        );
        Err(AuthorizationError {
            principal_id: principal.id,
            role: principal.role.clone(),
            action: action.to_string(),
            resource: resource.to_string(),
            reason: decision.reason,
        })
    }

    /// Evaluate without caching and report why access was granted or denied
    pub fn explain(
        &self,
        principal: &Principal,
        action: &str,
        resource: &str,
    ) -> AuthorizationDecision {
        self.first_satisfied(principal, action, resource)
    }

    pub fn clear_cache(&self) {
        let cleared = self.cache.len();
        self.cache.clear();
        info!(entries = cleared, "Policy cache cleared");
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_stats(&self) -> PolicyCacheStats {
        PolicyCacheStats {
            entries: self.cache.len(),
            hits: self.cache_hits.load(Ordering::Relaxed),
            misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }

    fn first_satisfied(
        &self,
        principal: &Principal,
        action: &str,
        resource: &str,
    ) -> AuthorizationDecision {
        let policies = self.policies.read();
        let mut applicable_rules = 0;

        for (name, policy) in policies.iter() {
            for rule in policy.rules.iter().filter(|r| r.applies_to(resource, action)) {
                applicable_rules += 1;
                if self.evaluator.evaluate(rule, principal) {
                    return AuthorizationDecision {
                        granted: true,
                        principal_id: principal.id,
                        action: action.to_string(),
                        resource: resource.to_string(),
                        matched_policy: Some(name.clone()),
                        matched_rule: Some(rule.clone()),
                        applicable_rules,
                        reason: format!("granted by policy '{name}'"),
                    };
                }
            }
        }

        let reason = if applicable_rules == 0 {
            format!("no policy covers {action} on {resource}")
        } else {
            format!(
                "role '{}' does not satisfy any of {applicable_rules} applicable rules",
                principal.role
            )
        };

        AuthorizationDecision {
            granted: false,
            principal_id: principal.id,
            action: action.to_string(),
            resource: resource.to_string(),
            matched_policy: None,
            matched_rule: None,
            applicable_rules,
            reason,
        }
    }
}
