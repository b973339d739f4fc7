//! Role-based access control.
//!
//! Users hold roles and roles hold permissions. A user has a permission iff
//! some role they hold carries it:
//! - `queries`: assignment and grant management
//! - `resolver`: pure set composition of the two hops
//! - `helpers`: transactional authorization checks

pub mod helpers;
pub mod queries;
pub mod resolver;

#[cfg(test)]
mod tests;

pub use helpers::{
    effective_permissions, has_permission, load_user_permission_context, UserPermissionContext,
};
pub use queries::{
    grant_permission_to_role, grant_role_to_user, permissions_for_role, revoke_permission_from_role,
    revoke_role_from_user, roles_for_user,
};
pub use resolver::{compute_effective_permissions, holds_permission};
