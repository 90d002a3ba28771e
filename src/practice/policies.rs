use crate::policy::{Policy, PolicyRule, WILDCARD};
use crate::practice::handlers::CLIENT_RESOURCE;

/// Policies for the client-management handlers.
///
/// Attorneys and paralegals with `clients.write` may create and update
/// clients; deleting needs an attorney holding `clients.delete`. Admins may
/// do anything.
pub fn default_policies() -> Vec<Policy> {
    vec![
        Policy::new("client_management")
            .with_rule(
                PolicyRule::new(CLIENT_RESOURCE, "create")
                    .require_roles(["attorney", "paralegal"])
                    .require_permissions(["clients.write"]),
            )
            .with_rule(
                PolicyRule::new(CLIENT_RESOURCE, "update")
                    .require_roles(["attorney", "paralegal"])
                    .require_permissions(["clients.write"]),
            )
            .with_rule(
                PolicyRule::new(CLIENT_RESOURCE, "delete")
                    .require_roles(["attorney"])
                    .require_permissions(["clients.delete"]),
            ),
        Policy::new("administrators")
            .with_rule(PolicyRule::new(WILDCARD, WILDCARD).require_roles(["admin"])),
    ]
}
