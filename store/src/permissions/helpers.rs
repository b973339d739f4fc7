//! Authorization checks.
//!
//! Load both hops of the user -> role -> permission graph inside one read
//! transaction, then resolve them with the pure functions in
//! [`super::resolver`]. A grant committed concurrently is either fully visible
//! to a check or not at all.

use std::collections::BTreeSet;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use super::queries::{granting_role_names, grants_for_user_roles, held_role_names};
use super::resolver::{compute_effective_permissions, holds_permission};
use crate::error::{require_name, Result, StoreError};

/// Pre-computed authorization context for a user.
///
/// An owned snapshot; later grants do not show up in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPermissionContext {
    pub user: String,

    /// Roles the user holds.
    pub roles: BTreeSet<String>,

    /// Union of the permissions of those roles.
    pub permissions: BTreeSet<String>,
}

impl UserPermissionContext {
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Check whether `user` holds `permission` through any of their roles.
///
/// An unknown user, a user without roles, or an unknown permission all
/// resolve to `false`. Only empty names and store failures are errors.
#[tracing::instrument(skip(pool))]
pub async fn has_permission(pool: &SqlitePool, user: &str, permission: &str) -> Result<bool> {
    const OP: &str = "has_permission";
    require_name(OP, "user", user)?;
    require_name(OP, "permission", permission)?;

    let map = |e: sqlx::Error| StoreError::from_sqlx(OP, e);
    let mut tx = pool.begin().await.map_err(map)?;

    let held: BTreeSet<String> = held_role_names(&mut tx, user)
        .await
        .map_err(map)?
        .into_iter()
        .collect();

    let allowed = if held.is_empty() {
        false
    } else {
        let granting: BTreeSet<String> = granting_role_names(&mut tx, permission)
            .await
            .map_err(map)?
            .into_iter()
            .collect();
        holds_permission(&held, &granting)
    };

    tx.commit().await.map_err(map)?;

    debug!(allowed, "Resolved permission check");
    Ok(allowed)
}

/// Load the full authorization context for a user.
///
/// An unknown user gets an empty context.
#[tracing::instrument(skip(pool))]
pub async fn load_user_permission_context(
    pool: &SqlitePool,
    user: &str,
) -> Result<UserPermissionContext> {
    const OP: &str = "load_user_permission_context";
    require_name(OP, "user", user)?;

    let map = |e: sqlx::Error| StoreError::from_sqlx(OP, e);
    let mut tx = pool.begin().await.map_err(map)?;

    let roles: BTreeSet<String> = held_role_names(&mut tx, user)
        .await
        .map_err(map)?
        .into_iter()
        .collect();
    let grants = grants_for_user_roles(&mut tx, user).await.map_err(map)?;

    tx.commit().await.map_err(map)?;

    let permissions = compute_effective_permissions(&roles, &grants);
    debug!(
        roles = roles.len(),
        permissions = permissions.len(),
        "Loaded permission context"
    );

    Ok(UserPermissionContext {
        user: user.to_string(),
        roles,
        permissions,
    })
}

/// Every permission `user` holds, as a sorted set.
pub async fn effective_permissions(pool: &SqlitePool, user: &str) -> Result<BTreeSet<String>> {
    load_user_permission_context(pool, user)
        .await
        .map(|ctx| ctx.permissions)
}
