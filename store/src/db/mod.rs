//! Database Layer
//!
//! `SQLite` store lifecycle: open, migrate, close.
//!
//! All query functions take a `&SqlitePool`. Once [`Store::close`] has run,
//! every clone of that pool rejects new work with `StoreClosed`.

mod models;
mod queries;


use std::path::Path;

pub use models::*;
pub use queries::*;
pub(crate) use queries::{find_entity_id, Table};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::Config;
use crate::error::{Result, StoreError};

/// Handle to an open authorization store.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open the store at `path` with default settings, creating it if absent.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(&Config::for_path(path)).await
    }

    /// Open the store described by `config` and bring its schema up to date.
    ///
    /// Re-opening an initialized store applies nothing new.
    pub async fn open_with(config: &Config) -> Result<Self> {
        const OP: &str = "open";

        let options = SqliteConnectOptions::new()
            .filename(&config.database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            // Surface a wedged database as an error instead of hanging
            .acquire_timeout(config.busy_timeout * 2)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::from_sqlx(OP, e))?;

        info!(path = %config.database_path.display(), "Opened authorization store");

        if let Err(err) = run_migrations(&pool).await {
            pool.close().await;
            return Err(err);
        }

        Ok(Self { pool })
    }

    /// Connection pool for the query functions.
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Close the store, waiting for in-flight operations to finish.
    ///
    /// Fails with `StoreClosed` if this store (or any clone) was already closed.
    pub async fn close(&self) -> Result<()> {
        if self.pool.is_closed() {
            return Err(StoreError::StoreClosed { operation: "close" });
        }
        self.pool.close().await;
        info!("Closed authorization store");
        Ok(())
    }
}

/// Run database migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::from_sqlx("migrate", sqlx::Error::from(e)))?;
    info!("Database migrations completed");
    Ok(())
}
