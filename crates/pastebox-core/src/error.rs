//! Error types for pastebox core operations.
//!
//! Only genuine faults live here. Expected outcomes (a missing or expired
//! paste, a create that lost to an existing record) are returned as
//! `Option`/`bool`/[`CreateOutcome`](crate::storage::CreateOutcome) values.

use std::path::Path;

use thiserror::Error;

/// Result type alias for pastebox operations.
pub type Result<T> = std::result::Result<T, PasteError>;

/// Core error type for pastebox operations.
#[derive(Debug, Error)]
pub enum PasteError {
    /// Identifier does not match the required format
    #[error("Invalid paste ID: {0}")]
    InvalidId(String),

    /// Caller supplied malformed metadata or options
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A parent resource required by the operation is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Underlying storage medium failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// A published record could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl PasteError {
    /// Build a storage error that names the operation and the path involved.
    pub fn storage(op: &str, path: &Path, err: std::io::Error) -> Self {
        PasteError::Storage(format!("{} {}: {}", op, path.display(), err))
    }

    /// Whether the error was caused by the caller rather than the medium.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            PasteError::InvalidId(_) | PasteError::InvalidInput(_) | PasteError::NotFound(_)
        )
    }
}

impl From<std::io::Error> for PasteError {
    fn from(err: std::io::Error) -> Self {
        PasteError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for PasteError {
    fn from(err: serde_json::Error) -> Self {
        PasteError::Corrupt(err.to_string())
    }
}
