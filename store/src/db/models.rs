//! Database models for the authorization store.
//!
//! Rows handed to callers are owned snapshots. Surrogate ids stay inside the
//! store; names are the only external key.

use std::fmt;

use serde::Serialize;
use sqlx::FromRow;

/// The kinds of record the store can report on in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Role,
    Permission,
    /// A (user, role) association.
    UserRole,
    /// A (role, permission) association.
    RolePermission,
}

impl EntityKind {
    /// Label used in error messages and log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Role => "role",
            Self::Permission => "permission",
            Self::UserRole => "user role assignment",
            Self::RolePermission => "role permission grant",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User record.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
    pub name: String,
}

/// Role record.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Role {
    pub name: String,
}

/// Permission record.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Permission {
    pub name: String,
}

/// A permission granted to a role, by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, FromRow, Serialize)]
pub struct RoleGrant {
    pub role: String,
    pub permission: String,
}
