//! Fresh on-disk stores for unit tests.

use tempfile::TempDir;

use crate::Store;

/// Open a store in a new temporary directory.
///
/// Keep the `TempDir` alive for as long as the store is used.
pub async fn temp_store() -> (TempDir, Store) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = Store::open(dir.path().join("rbac.db"))
        .await
        .expect("Failed to open store");
    (dir, store)
}
