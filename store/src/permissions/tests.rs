//! Relation store and resolver tests against a real `SQLite` file.

use std::collections::BTreeSet;

use super::*;
use crate::db::{add_permission, add_role, add_user, EntityKind};
use crate::test_support::temp_store;
use crate::StoreError;

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

/// alice -> admin -> write
async fn seed_alice(pool: &sqlx::SqlitePool) {
    add_user(pool, "alice").await.unwrap();
    add_role(pool, "admin").await.unwrap();
    add_permission(pool, "write").await.unwrap();
    assert!(grant_role_to_user(pool, "alice", "admin").await.unwrap());
    assert!(grant_permission_to_role(pool, "admin", "write").await.unwrap());
}

// ============================================================================
// Grant Tests
// ============================================================================

#[tokio::test]
async fn test_grant_requires_existing_user() {
    let (_dir, store) = temp_store().await;
    let pool = store.pool();
    add_role(pool, "admin").await.unwrap();

    let err = grant_role_to_user(pool, "ghost", "admin").await.unwrap_err();
    assert!(
        matches!(
            &err,
            StoreError::NotFound { kind: EntityKind::User, name, .. } if name == "ghost"
        ),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn test_grant_requires_existing_role() {
    let (_dir, store) = temp_store().await;
    let pool = store.pool();
    add_user(pool, "alice").await.unwrap();

    let err = grant_role_to_user(pool, "alice", "ghost").await.unwrap_err();
    assert!(
        matches!(
            &err,
            StoreError::NotFound { kind: EntityKind::Role, name, .. } if name == "ghost"
        ),
        "unexpected error: {err}"
    );
    assert!(roles_for_user(pool, "alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_grant_reports_user_first_when_both_missing() {
    let (_dir, store) = temp_store().await;

    let err = grant_role_to_user(store.pool(), "ghost", "phantom")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            kind: EntityKind::User,
            ..
        }
    ));
}

#[tokio::test]
async fn test_grant_permission_requires_both_endpoints() {
    let (_dir, store) = temp_store().await;
    let pool = store.pool();
    add_role(pool, "admin").await.unwrap();

    let err = grant_permission_to_role(pool, "admin", "write")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            kind: EntityKind::Permission,
            ..
        }
    ));

    let err = grant_permission_to_role(pool, "nobody", "write")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            kind: EntityKind::Role,
            ..
        }
    ));
}

#[tokio::test]
async fn test_grant_rejects_empty_names() {
    let (_dir, store) = temp_store().await;
    let pool = store.pool();

    assert!(grant_role_to_user(pool, "", "admin")
        .await
        .unwrap_err()
        .is_invalid_argument());
    assert!(grant_role_to_user(pool, "alice", "")
        .await
        .unwrap_err()
        .is_invalid_argument());
    assert!(grant_permission_to_role(pool, "", "read")
        .await
        .unwrap_err()
        .is_invalid_argument());
    assert!(grant_permission_to_role(pool, "admin", "")
        .await
        .unwrap_err()
        .is_invalid_argument());
}

#[tokio::test]
async fn test_duplicate_grants_are_noops() {
    let (_dir, store) = temp_store().await;
    let pool = store.pool();
    seed_alice(pool).await;

    assert!(!grant_role_to_user(pool, "alice", "admin").await.unwrap());
    assert!(!grant_permission_to_role(pool, "admin", "write")
        .await
        .unwrap());

    assert_eq!(roles_for_user(pool, "alice").await.unwrap().len(), 1);
    assert_eq!(permissions_for_role(pool, "admin").await.unwrap().len(), 1);
    assert!(has_permission(pool, "alice", "write").await.unwrap());

    // One revoke removes the only edge
    revoke_permission_from_role(pool, "admin", "write")
        .await
        .unwrap();
    assert!(!has_permission(pool, "alice", "write").await.unwrap());
}

// ============================================================================
// Revoke Tests
// ============================================================================

#[tokio::test]
async fn test_revoke_role_from_user() {
    let (_dir, store) = temp_store().await;
    let pool = store.pool();
    seed_alice(pool).await;

    revoke_role_from_user(pool, "alice", "admin").await.unwrap();

    assert!(roles_for_user(pool, "alice").await.unwrap().is_empty());
    assert!(!has_permission(pool, "alice", "write").await.unwrap());
    // The role keeps its grant
    assert_eq!(permissions_for_role(pool, "admin").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_revoke_missing_association() {
    let (_dir, store) = temp_store().await;
    let pool = store.pool();
    add_user(pool, "alice").await.unwrap();
    add_role(pool, "admin").await.unwrap();

    let err = revoke_role_from_user(pool, "alice", "admin")
        .await
        .unwrap_err();
    assert!(
        matches!(
            &err,
            StoreError::NotFound { kind: EntityKind::UserRole, name, .. } if name == "alice -> admin"
        ),
        "unexpected error: {err}"
    );

    let err = revoke_role_from_user(pool, "alice", "ghost")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            kind: EntityKind::Role,
            ..
        }
    ));
}

#[tokio::test]
async fn test_revoke_twice_fails_second_time() {
    let (_dir, store) = temp_store().await;
    let pool = store.pool();
    seed_alice(pool).await;

    revoke_permission_from_role(pool, "admin", "write")
        .await
        .unwrap();
    let err = revoke_permission_from_role(pool, "admin", "write")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            kind: EntityKind::RolePermission,
            ..
        }
    ));
}

// ============================================================================
// Listing Tests
// ============================================================================

#[tokio::test]
async fn test_listing_requires_subject() {
    let (_dir, store) = temp_store().await;
    let pool = store.pool();

    assert!(roles_for_user(pool, "ghost").await.unwrap_err().is_not_found());
    assert!(permissions_for_role(pool, "ghost")
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_listing_is_sorted() {
    let (_dir, store) = temp_store().await;
    let pool = store.pool();
    add_user(pool, "alice").await.unwrap();
    for role in ["ops", "admin", "dev"] {
        add_role(pool, role).await.unwrap();
        grant_role_to_user(pool, "alice", role).await.unwrap();
    }

    let names: Vec<String> = roles_for_user(pool, "alice")
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["admin", "dev", "ops"]);
}

// ============================================================================
// Resolver Tests
// ============================================================================

#[tokio::test]
async fn test_has_permission_two_hops() {
    let (_dir, store) = temp_store().await;
    let pool = store.pool();
    seed_alice(pool).await;
    add_permission(pool, "read").await.unwrap();

    assert!(has_permission(pool, "alice", "write").await.unwrap());
    assert!(!has_permission(pool, "alice", "read").await.unwrap());
    assert!(!has_permission(pool, "bob", "write").await.unwrap());
    assert!(!has_permission(pool, "alice", "nonexistent").await.unwrap());
}

#[tokio::test]
async fn test_has_permission_rejects_empty_names() {
    let (_dir, store) = temp_store().await;
    let pool = store.pool();

    assert!(has_permission(pool, "", "read")
        .await
        .unwrap_err()
        .is_invalid_argument());
    assert!(has_permission(pool, "alice", "")
        .await
        .unwrap_err()
        .is_invalid_argument());
}

#[tokio::test]
async fn test_user_without_roles_has_nothing() {
    let (_dir, store) = temp_store().await;
    let pool = store.pool();
    seed_alice(pool).await;
    add_user(pool, "carol").await.unwrap();

    assert!(!has_permission(pool, "carol", "write").await.unwrap());
    assert!(effective_permissions(pool, "carol").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_no_leakage_across_roles() {
    let (_dir, store) = temp_store().await;
    let pool = store.pool();
    seed_alice(pool).await;
    add_user(pool, "dave").await.unwrap();
    add_role(pool, "viewer").await.unwrap();
    grant_role_to_user(pool, "dave", "viewer").await.unwrap();

    assert!(!has_permission(pool, "dave", "write").await.unwrap());
}

#[tokio::test]
async fn test_effective_permissions_union() {
    let (_dir, store) = temp_store().await;
    let pool = store.pool();
    seed_alice(pool).await;
    for permission in ["read", "exec"] {
        add_permission(pool, permission).await.unwrap();
    }
    add_role(pool, "user").await.unwrap();
    grant_permission_to_role(pool, "user", "read").await.unwrap();
    grant_permission_to_role(pool, "user", "write").await.unwrap();
    grant_role_to_user(pool, "alice", "user").await.unwrap();

    let ctx = load_user_permission_context(pool, "alice").await.unwrap();
    assert_eq!(ctx.roles, set(&["admin", "user"]));
    assert_eq!(ctx.permissions, set(&["read", "write"]));
    assert!(ctx.has_permission("read"));
    assert!(!ctx.has_permission("exec"));

    assert_eq!(
        effective_permissions(pool, "alice").await.unwrap(),
        set(&["read", "write"])
    );
    assert!(effective_permissions(pool, "nobody")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_check_after_close_fails() {
    let (_dir, store) = temp_store().await;
    seed_alice(store.pool()).await;
    store.close().await.unwrap();

    let err = has_permission(store.pool(), "alice", "write")
        .await
        .unwrap_err();
    assert!(err.is_store_closed(), "unexpected error: {err}");
    assert!(grant_role_to_user(store.pool(), "alice", "admin")
        .await
        .unwrap_err()
        .is_store_closed());
}
