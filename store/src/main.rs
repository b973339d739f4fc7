//! RBAC Store - Seed Entry Point
//!
//! Opens the configured store, loads a small sample authorization graph and
//! logs a few checks against it. Safe to run repeatedly.

use anyhow::Result;
use tracing::{info, warn};

use rbac_store::{config, db, permissions, Store, StoreError};

const ROLES: &[&str] = &["user", "admin"];

const USERS: &[&str] = &["bdowns", "jmoore", "jdowns", "mdowns", "dlafrance"];

const PERMISSIONS: &[&str] = &["read", "write", "exec"];

const ROLE_PERMISSIONS: &[(&str, &str)] = &[
    ("admin", "read"),
    ("admin", "write"),
    ("admin", "exec"),
    ("user", "read"),
];

const USER_ROLES: &[(&str, &str)] = &[
    ("bdowns", "admin"),
    ("jmoore", "user"),
    ("jdowns", "user"),
    ("mdowns", "user"),
    ("dlafrance", "user"),
];

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rbac_store=debug,rbac_seed=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        path = %config.database_path.display(),
        "Seeding authorization store"
    );

    let store = Store::open_with(&config).await?;
    let seeded = seed(&store).await;
    // Close even if seeding failed part-way
    store.close().await?;
    seeded?;

    info!("Seeding complete");
    Ok(())
}

async fn seed(store: &Store) -> Result<()> {
    let pool = store.pool();

    for role in ROLES {
        skip_existing(db::add_role(pool, role).await)?;
    }
    for user in USERS {
        skip_existing(db::add_user(pool, user).await)?;
    }
    for permission in PERMISSIONS {
        skip_existing(db::add_permission(pool, permission).await)?;
    }

    for (role, permission) in ROLE_PERMISSIONS {
        permissions::grant_permission_to_role(pool, role, permission).await?;
    }
    for (user, role) in USER_ROLES {
        permissions::grant_role_to_user(pool, user, role).await?;
    }

    for (user, permission) in [("bdowns", "exec"), ("jmoore", "read"), ("jmoore", "exec")] {
        let allowed = permissions::has_permission(pool, user, permission).await?;
        info!(user, permission, allowed, "Authorization check");
    }

    Ok(())
}

/// Treat an entity left over from an earlier run as seeded.
fn skip_existing(result: rbac_store::Result<()>) -> rbac_store::Result<()> {
    match result {
        Err(err @ StoreError::AlreadyExists { .. }) => {
            warn!(error = %err, "Skipping existing entity");
            Ok(())
        }
        other => other,
    }
}
