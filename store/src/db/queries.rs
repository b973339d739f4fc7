//! Identity registry queries.
//!
//! Users, roles and permissions are created once and looked up by name.
//! Every name is bound as a statement parameter.

use sqlx::{Sqlite, SqlitePool};
use tracing::debug;

use super::models::{EntityKind, Permission, Role, User};
use crate::error::{require_name, Result, StoreError};

// ============================================================================
// Entity Creation
// ============================================================================

/// Register a new user.
///
/// Fails with `AlreadyExists` if the name is taken; nothing is written.
pub async fn add_user(pool: &SqlitePool, name: &str) -> Result<()> {
    insert_entity(pool, "add_user", Table::Users, name).await
}

/// Register a new role.
pub async fn add_role(pool: &SqlitePool, name: &str) -> Result<()> {
    insert_entity(pool, "add_role", Table::Roles, name).await
}

/// Register a new permission.
pub async fn add_permission(pool: &SqlitePool, name: &str) -> Result<()> {
    insert_entity(pool, "add_permission", Table::Permissions, name).await
}

/// The three entity tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Table {
    Users,
    Roles,
    Permissions,
}

impl Table {
    pub(crate) const fn kind(self) -> EntityKind {
        match self {
            Self::Users => EntityKind::User,
            Self::Roles => EntityKind::Role,
            Self::Permissions => EntityKind::Permission,
        }
    }

    const fn insert_sql(self) -> &'static str {
        match self {
            Self::Users => "INSERT INTO users (name) VALUES (?1)",
            Self::Roles => "INSERT INTO roles (name) VALUES (?1)",
            Self::Permissions => "INSERT INTO permissions (name) VALUES (?1)",
        }
    }

    const fn find_id_sql(self) -> &'static str {
        match self {
            Self::Users => "SELECT id FROM users WHERE name = ?1",
            Self::Roles => "SELECT id FROM roles WHERE name = ?1",
            Self::Permissions => "SELECT id FROM permissions WHERE name = ?1",
        }
    }
}

async fn insert_entity(
    pool: &SqlitePool,
    operation: &'static str,
    table: Table,
    name: &str,
) -> Result<()> {
    let kind = table.kind();
    require_name(operation, kind.as_str(), name)?;

    match sqlx::query(table.insert_sql()).bind(name).execute(pool).await {
        Ok(_) => {
            debug!(kind = %kind, name, "Registered entity");
            Ok(())
        }
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(StoreError::AlreadyExists {
                operation,
                kind,
                name: name.to_string(),
            })
        }
        Err(e) => Err(StoreError::from_sqlx(operation, e)),
    }
}

// ============================================================================
// Listing
// ============================================================================

/// All users, ordered by name.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    sqlx::query_as::<_, User>("SELECT name FROM users ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(|e| StoreError::from_sqlx("list_users", e))
}

/// All roles, ordered by name.
pub async fn list_roles(pool: &SqlitePool) -> Result<Vec<Role>> {
    sqlx::query_as::<_, Role>("SELECT name FROM roles ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(|e| StoreError::from_sqlx("list_roles", e))
}

/// All permissions, ordered by name.
pub async fn list_permissions(pool: &SqlitePool) -> Result<Vec<Permission>> {
    sqlx::query_as::<_, Permission>("SELECT name FROM permissions ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(|e| StoreError::from_sqlx("list_permissions", e))
}

// ============================================================================
// Internal Lookups
// ============================================================================

/// Resolve an entity name to its surrogate id.
///
/// Runs on whatever executor the caller holds, so relation code can look up
/// both endpoints inside its own transaction.
pub(crate) async fn find_entity_id<'e, E>(
    executor: E,
    table: Table,
    name: &str,
) -> sqlx::Result<Option<i64>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, i64>(table.find_id_sql())
        .bind(name)
        .fetch_optional(executor)
        .await
}
