//! Policy and rule definitions, plus the mapping from command type names to
//! the (resource, action) pair a rule is written against.

use crate::policy::Principal;
use serde::{Deserialize, Serialize};

/// Matches any resource or any action in a rule
pub const WILDCARD: &str = "*";

/// Conditions a principal must satisfy for a rule to grant access
///
/// An empty role list accepts any role; every listed permission is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConditions {
    #[serde(default)]
    pub required_roles: Vec<String>,
    #[serde(default)]
    pub required_permissions: Vec<String>,
}

impl RuleConditions {
    pub fn is_satisfied_by(&self, principal: &Principal) -> bool {
        let role_ok = self.required_roles.is_empty()
            || self.required_roles.iter().any(|role| principal.has_role(role));

        role_ok
            && self
                .required_permissions
                .iter()
                .all(|permission| principal.has_permission(permission))
    }
}

/// One (resource, action) → conditions association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub resource: String,
    pub action: String,
    #[serde(default)]
    pub conditions: RuleConditions,
}

impl PolicyRule {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            conditions: RuleConditions::default(),
        }
    }

    pub fn require_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions.required_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn require_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions.required_permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this rule applies to `action` on `resource`
    pub fn applies_to(&self, resource: &str, action: &str) -> bool {
        (self.resource == WILDCARD || self.resource == resource)
            && (self.action == WILDCARD || self.action == action)
    }
}

/// A named set of rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    pub rules: Vec<PolicyRule>,
}

impl Policy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: PolicyRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// The resource and action a command type is authorized against
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandTarget {
    pub resource: String,
    pub action: String,
}

impl CommandTarget {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// Derive the target from a command type name.
    ///
    /// `CreateClientCommand` → action `create`, resource `client`;
    /// `AssignMatterAttorneyCommand` → action `assign`, resource `matter_attorney`.
    pub fn from_command_name(command_type: &str) -> Self {
        let base = command_type.strip_suffix("Command").unwrap_or(command_type);
        let words = split_camel_case(base);

        let mut words = words.into_iter().map(|w| w.to_ascii_lowercase());
        let action = words.next().unwrap_or_default();
        let resource = words.collect::<Vec<_>>().join("_");

        Self { resource, action }
    }
}

/// Split `CreateAIJob` into `Create`, `AI`, `Job`
fn split_camel_case(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_ascii_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}
