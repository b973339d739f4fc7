//! Database queries for the relation store.
//!
//! Provides async functions for managing:
//! - User role assignments
//! - Role permission grants
//! - The per-hop lookups the resolver composes
//!
//! Each mutation runs in its own transaction. A failed call leaves both
//! association tables exactly as they were.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::db::{find_entity_id, EntityKind, Permission, Role, RoleGrant, Table};
use crate::error::{pair_label, require_name, Result, StoreError};

/// The two association tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Association {
    UserRole,
    RolePermission,
}

impl Association {
    const fn kind(self) -> EntityKind {
        match self {
            Self::UserRole => EntityKind::UserRole,
            Self::RolePermission => EntityKind::RolePermission,
        }
    }

    const fn endpoints(self) -> (Table, Table) {
        match self {
            Self::UserRole => (Table::Users, Table::Roles),
            Self::RolePermission => (Table::Roles, Table::Permissions),
        }
    }

    /// Inserts nothing when either name is unknown or the pair already exists.
    const fn insert_sql(self) -> &'static str {
        match self {
            Self::UserRole => {
                r"
                INSERT INTO user_roles (user_id, role_id)
                SELECT u.id, r.id
                FROM users AS u, roles AS r
                WHERE u.name = ?1 AND r.name = ?2
                ON CONFLICT (user_id, role_id) DO NOTHING
                "
            }
            Self::RolePermission => {
                r"
                INSERT INTO role_permissions (role_id, permission_id)
                SELECT r.id, p.id
                FROM roles AS r, permissions AS p
                WHERE r.name = ?1 AND p.name = ?2
                ON CONFLICT (role_id, permission_id) DO NOTHING
                "
            }
        }
    }

    const fn delete_sql(self) -> &'static str {
        match self {
            Self::UserRole => {
                r"
                DELETE FROM user_roles
                WHERE user_id = (SELECT id FROM users WHERE name = ?1)
                  AND role_id = (SELECT id FROM roles WHERE name = ?2)
                "
            }
            Self::RolePermission => {
                r"
                DELETE FROM role_permissions
                WHERE role_id = (SELECT id FROM roles WHERE name = ?1)
                  AND permission_id = (SELECT id FROM permissions WHERE name = ?2)
                "
            }
        }
    }
}

// ============================================================================
// User Role Assignments
// ============================================================================

/// Assign a role to a user.
///
/// Returns `true` if the assignment was created, `false` if the user already
/// held the role. Fails with `NotFound` naming the missing side if either
/// entity does not exist.
pub async fn grant_role_to_user(pool: &SqlitePool, user: &str, role: &str) -> Result<bool> {
    const OP: &str = "grant_role_to_user";
    require_name(OP, "user", user)?;
    require_name(OP, "role", role)?;
    grant(pool, OP, Association::UserRole, user, role).await
}

/// Remove a role from a user.
///
/// Fails with `NotFound` if either entity is missing or the user does not
/// hold the role.
pub async fn revoke_role_from_user(pool: &SqlitePool, user: &str, role: &str) -> Result<()> {
    const OP: &str = "revoke_role_from_user";
    require_name(OP, "user", user)?;
    require_name(OP, "role", role)?;
    revoke(pool, OP, Association::UserRole, user, role).await
}

/// Roles assigned to a user, ordered by name.
pub async fn roles_for_user(pool: &SqlitePool, user: &str) -> Result<Vec<Role>> {
    const OP: &str = "roles_for_user";
    require_name(OP, "user", user)?;

    let map = |e: sqlx::Error| StoreError::from_sqlx(OP, e);
    let mut tx = pool.begin().await.map_err(map)?;

    let Some(user_id) = find_entity_id(&mut *tx, Table::Users, user)
        .await
        .map_err(map)?
    else {
        return Err(StoreError::not_found(OP, EntityKind::User, user));
    };

    let roles = sqlx::query_as::<_, Role>(
        r"
        SELECT r.name
        FROM roles AS r
        INNER JOIN user_roles AS ur ON ur.role_id = r.id
        WHERE ur.user_id = ?1
        ORDER BY r.name
        ",
    )
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await
    .map_err(map)?;

    tx.commit().await.map_err(map)?;
    Ok(roles)
}

// ============================================================================
// Role Permission Grants
// ============================================================================

/// Grant a permission to a role.
///
/// Returns `true` if the grant was created, `false` if the role already held
/// the permission.
pub async fn grant_permission_to_role(
    pool: &SqlitePool,
    role: &str,
    permission: &str,
) -> Result<bool> {
    const OP: &str = "grant_permission_to_role";
    require_name(OP, "role", role)?;
    require_name(OP, "permission", permission)?;
    grant(pool, OP, Association::RolePermission, role, permission).await
}

/// Remove a permission from a role.
pub async fn revoke_permission_from_role(
    pool: &SqlitePool,
    role: &str,
    permission: &str,
) -> Result<()> {
    const OP: &str = "revoke_permission_from_role";
    require_name(OP, "role", role)?;
    require_name(OP, "permission", permission)?;
    revoke(pool, OP, Association::RolePermission, role, permission).await
}

/// Permissions granted to a role, ordered by name.
pub async fn permissions_for_role(pool: &SqlitePool, role: &str) -> Result<Vec<Permission>> {
    const OP: &str = "permissions_for_role";
    require_name(OP, "role", role)?;

    let map = |e: sqlx::Error| StoreError::from_sqlx(OP, e);
    let mut tx = pool.begin().await.map_err(map)?;

    let Some(role_id) = find_entity_id(&mut *tx, Table::Roles, role)
        .await
        .map_err(map)?
    else {
        return Err(StoreError::not_found(OP, EntityKind::Role, role));
    };

    let permissions = sqlx::query_as::<_, Permission>(
        r"
        SELECT p.name
        FROM permissions AS p
        INNER JOIN role_permissions AS rp ON rp.permission_id = p.id
        WHERE rp.role_id = ?1
        ORDER BY p.name
        ",
    )
    .bind(role_id)
    .fetch_all(&mut *tx)
    .await
    .map_err(map)?;

    tx.commit().await.map_err(map)?;
    Ok(permissions)
}

// ============================================================================
// Resolver Hops
// ============================================================================

/// First hop: names of the roles a user holds. Empty for an unknown user.
pub(crate) async fn held_role_names(
    conn: &mut SqliteConnection,
    user: &str,
) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r"
        SELECT r.name
        FROM user_roles AS ur
        INNER JOIN users AS u ON u.id = ur.user_id
        INNER JOIN roles AS r ON r.id = ur.role_id
        WHERE u.name = ?1
        ",
    )
    .bind(user)
    .fetch_all(conn)
    .await
}

/// Second hop, filtered: names of the roles that carry one permission.
pub(crate) async fn granting_role_names(
    conn: &mut SqliteConnection,
    permission: &str,
) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r"
        SELECT r.name
        FROM role_permissions AS rp
        INNER JOIN permissions AS p ON p.id = rp.permission_id
        INNER JOIN roles AS r ON r.id = rp.role_id
        WHERE p.name = ?1
        ",
    )
    .bind(permission)
    .fetch_all(conn)
    .await
}

/// Second hop, unfiltered: every grant on the roles a user holds.
pub(crate) async fn grants_for_user_roles(
    conn: &mut SqliteConnection,
    user: &str,
) -> sqlx::Result<Vec<RoleGrant>> {
    sqlx::query_as::<_, RoleGrant>(
        r"
        SELECT r.name AS role, p.name AS permission
        FROM role_permissions AS rp
        INNER JOIN roles AS r ON r.id = rp.role_id
        INNER JOIN permissions AS p ON p.id = rp.permission_id
        WHERE rp.role_id IN (
            SELECT ur.role_id
            FROM user_roles AS ur
            INNER JOIN users AS u ON u.id = ur.user_id
            WHERE u.name = ?1
        )
        ",
    )
    .bind(user)
    .fetch_all(conn)
    .await
}

// ============================================================================
// Shared Mutation Paths
// ============================================================================

async fn grant(
    pool: &SqlitePool,
    operation: &'static str,
    association: Association,
    left: &str,
    right: &str,
) -> Result<bool> {
    let map = |e: sqlx::Error| StoreError::from_sqlx(operation, e);
    let mut tx = pool.begin().await.map_err(map)?;

    let inserted = sqlx::query(association.insert_sql())
        .bind(left)
        .bind(right)
        .execute(&mut *tx)
        .await
        .map_err(map)?
        .rows_affected();

    if inserted == 0 {
        // Nothing written: either an endpoint is missing or the pair exists.
        require_endpoints(&mut tx, operation, association, left, right).await?;
        debug!(kind = %association.kind(), left, right, "Association already present");
        return Ok(false);
    }

    tx.commit().await.map_err(map)?;
    debug!(kind = %association.kind(), left, right, "Association created");
    Ok(true)
}

async fn revoke(
    pool: &SqlitePool,
    operation: &'static str,
    association: Association,
    left: &str,
    right: &str,
) -> Result<()> {
    let map = |e: sqlx::Error| StoreError::from_sqlx(operation, e);
    let mut tx = pool.begin().await.map_err(map)?;

    let deleted = sqlx::query(association.delete_sql())
        .bind(left)
        .bind(right)
        .execute(&mut *tx)
        .await
        .map_err(map)?
        .rows_affected();

    if deleted == 0 {
        require_endpoints(&mut tx, operation, association, left, right).await?;
        return Err(StoreError::not_found(
            operation,
            association.kind(),
            &pair_label(left, right),
        ));
    }

    tx.commit().await.map_err(map)?;
    debug!(kind = %association.kind(), left, right, "Association removed");
    Ok(())
}

/// Fail with `NotFound` naming the first endpoint that does not exist.
async fn require_endpoints(
    conn: &mut SqliteConnection,
    operation: &'static str,
    association: Association,
    left: &str,
    right: &str,
) -> Result<()> {
    let (left_table, right_table) = association.endpoints();

    for (table, name) in [(left_table, left), (right_table, right)] {
        let found = find_entity_id(&mut *conn, table, name)
            .await
            .map_err(|e| StoreError::from_sqlx(operation, e))?;
        if found.is_none() {
            return Err(StoreError::not_found(operation, table.kind(), name));
        }
    }

    Ok(())
}
