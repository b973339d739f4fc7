//! Store Error Types

use crate::db::EntityKind;

/// Errors returned by every store operation.
///
/// Each variant names the operation that failed and, where there is one, the
/// identifier that caused it, so callers can log the value as-is.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Empty or malformed input. Raised before the store is touched.
    #[error("{operation}: invalid {field}: {reason}")]
    InvalidArgument {
        operation: &'static str,
        field: &'static str,
        reason: &'static str,
    },

    /// An entity with this name already exists.
    #[error("{operation}: {kind} '{name}' already exists")]
    AlreadyExists {
        operation: &'static str,
        kind: EntityKind,
        name: String,
    },

    /// A referenced entity or association does not exist.
    #[error("{operation}: {kind} '{name}' not found")]
    NotFound {
        operation: &'static str,
        kind: EntityKind,
        name: String,
    },

    /// The backing database could not be opened, read or written.
    #[error("{operation}: store unavailable: {source}")]
    StoreUnavailable {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// The store was closed before this operation was issued.
    #[error("{operation}: store is closed")]
    StoreClosed { operation: &'static str },
}

/// Store result type.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Classify a driver error raised while running `operation`.
    pub fn from_sqlx(operation: &'static str, source: sqlx::Error) -> Self {
        match source {
            sqlx::Error::PoolClosed => Self::StoreClosed { operation },
            source => Self::StoreUnavailable { operation, source },
        }
    }

    pub(crate) fn not_found(operation: &'static str, kind: EntityKind, name: &str) -> Self {
        Self::NotFound {
            operation,
            kind,
            name: name.to_string(),
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub const fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    pub const fn is_store_closed(&self) -> bool {
        matches!(self, Self::StoreClosed { .. })
    }
}

/// Reject names the store will never hold.
pub(crate) fn require_name(
    operation: &'static str,
    field: &'static str,
    name: &str,
) -> Result<()> {
    if name.is_empty() {
        return Err(StoreError::InvalidArgument {
            operation,
            field,
            reason: "name must not be empty",
        });
    }
    Ok(())
}

/// Label for an association in `NotFound` errors, e.g. `alice -> admin`.
pub(crate) fn pair_label(left: &str, right: &str) -> String {
    format!("{left} -> {right}")
}
