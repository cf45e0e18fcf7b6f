//! Error taxonomy for the persistence layer.

use thiserror::Error;

/// Any failure originating from a task store backend.
///
/// Validation failures are a separate concern (see [`crate::validate`])
/// and are checked before a store call is ever attempted.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row addressed by id does not exist.
    #[error("task not found: {0}")]
    NotFound(i64),

    /// SQLite-level failure: file inaccessible, constraint violation,
    /// unreadable row.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The remote backend rejected the request and said why.
    #[error("backend error: {message}")]
    Backend { message: String },

    /// The remote backend could not be reached at all.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Whether this error means the addressed row does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
