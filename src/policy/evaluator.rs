use crate::policy::{PolicyRule, Principal};
use std::fmt::Debug;

/// Decides whether a principal satisfies an applicable rule.
///
/// The service only calls this for rules whose resource and action already
/// match; swapping the evaluator changes how conditions are interpreted.
pub trait RuleEvaluator: Send + Sync + Debug {
    fn evaluate(&self, rule: &PolicyRule, principal: &Principal) -> bool;
}

/// Role membership plus required permissions
#[derive(Debug, Default, Clone, Copy)]
pub struct RoleBasedEvaluator;

impl RuleEvaluator for RoleBasedEvaluator {
    fn evaluate(&self, rule: &PolicyRule, principal: &Principal) -> bool {
        rule.conditions.is_satisfied_by(principal)
    }
}
