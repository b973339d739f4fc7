//! Permission resolution logic.
//!
//! Users hold roles, roles hold permissions. These functions compose the two
//! hops over rows already fetched from the store, so the outcome depends only
//! on set contents and never on row order.

use std::collections::BTreeSet;

use crate::db::RoleGrant;

/// Compute the permissions a user holds through `held_roles`.
///
/// Grants belonging to roles the user does not hold are ignored.
pub fn compute_effective_permissions(
    held_roles: &BTreeSet<String>,
    grants: &[RoleGrant],
) -> BTreeSet<String> {
    grants
        .iter()
        .filter(|grant| held_roles.contains(&grant.role))
        .map(|grant| grant.permission.clone())
        .collect()
}

/// Check a single permission.
///
/// `granting_roles` are the roles that carry the permission. The user holds
/// it iff at least one of those roles is also held. Either set being empty
/// (unknown user, user without roles, unknown or ungranted permission) means
/// no access.
pub fn holds_permission(held_roles: &BTreeSet<String>, granting_roles: &BTreeSet<String>) -> bool {
    !held_roles.is_disjoint(granting_roles)
}
