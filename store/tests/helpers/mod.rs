//! Reusable helpers for store integration tests.
//!
//! Each test gets its own database file inside a [`TestStore`]-owned temp
//! directory, so tests never share state.
#![allow(dead_code)]

use std::path::PathBuf;

use rbac_store::{db, permissions, Store};
use tempfile::TempDir;

/// A store plus the directory that holds its file.
pub struct TestStore {
    pub dir: TempDir,
    pub store: Store,
}

impl TestStore {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = Store::open(dir.path().join("rbac.db"))
            .await
            .expect("Failed to open store");
        Self { dir, store }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("rbac.db")
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        self.store.pool()
    }

    /// Open a second, independent handle on the same file.
    pub async fn reopen(&self) -> Store {
        Store::open(self.path())
            .await
            .expect("Failed to reopen store")
    }
}

/// Create every name in each slice and apply the grants.
pub async fn seed_graph(
    store: &Store,
    users: &[&str],
    roles: &[&str],
    perms: &[&str],
    user_roles: &[(&str, &str)],
    role_perms: &[(&str, &str)],
) {
    let pool = store.pool();
    for user in users {
        db::add_user(pool, user).await.expect("Failed to add user");
    }
    for role in roles {
        db::add_role(pool, role).await.expect("Failed to add role");
    }
    for perm in perms {
        db::add_permission(pool, perm)
            .await
            .expect("Failed to add permission");
    }
    for (user, role) in user_roles {
        permissions::grant_role_to_user(pool, user, role)
            .await
            .expect("Failed to grant role");
    }
    for (role, perm) in role_perms {
        permissions::grant_permission_to_role(pool, role, perm)
            .await
            .expect("Failed to grant permission");
    }
}
