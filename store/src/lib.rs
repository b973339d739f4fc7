//! RBAC Store
//!
//! Embedded role-based access control store: users, roles and permissions,
//! the many-to-many links between them, and the check "does user U hold
//! permission P?".
//!
//! ```ignore
//! use rbac_store::{db, permissions, Store};
//!
//! let store = Store::open("rbac.db").await?;
//! db::add_user(store.pool(), "alice").await?;
//! db::add_role(store.pool(), "admin").await?;
//! db::add_permission(store.pool(), "write").await?;
//! permissions::grant_role_to_user(store.pool(), "alice", "admin").await?;
//! permissions::grant_permission_to_role(store.pool(), "admin", "write").await?;
//! assert!(permissions::has_permission(store.pool(), "alice", "write").await?);
//! store.close().await?;
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod permissions;

#[cfg(test)]
mod test_support;

pub use db::Store;
pub use error::{Result, StoreError};
