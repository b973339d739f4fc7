//! Store Configuration
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Result};

/// Store configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// `SQLite` database file (created if missing)
    pub database_path: PathBuf,

    /// Maximum pooled connections (default: 4)
    pub max_connections: u32,

    /// How long a statement waits on a locked database before failing
    /// (default: 5000 ms)
    pub busy_timeout: Duration,
}

impl Config {
    /// Default database location when `RBAC_DATABASE_PATH` is unset.
    pub const DEFAULT_DATABASE_PATH: &'static str = "rbac.db";

    /// Defaults for a database at `path`.
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        Self {
            database_path: path.as_ref().to_path_buf(),
            max_connections: 4,
            busy_timeout: Duration::from_millis(5000),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::for_path(
            var("RBAC_DATABASE_PATH").unwrap_or_else(|| Self::DEFAULT_DATABASE_PATH.into()),
        );

        let config = Self {
            max_connections: var("RBAC_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_connections),
            busy_timeout: var("RBAC_BUSY_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .map_or(defaults.busy_timeout, Duration::from_millis),
            ..defaults
        };

        ensure!(
            !config.database_path.as_os_str().is_empty(),
            "RBAC_DATABASE_PATH must not be empty"
        );
        ensure!(
            config.max_connections > 0,
            "RBAC_MAX_CONNECTIONS must be at least 1"
        );

        Ok(config)
    }
}
