//! Storage error types
//!
//! Defines all errors that can occur in the storage backends. None of these
//! ever reach the UI layer: the typed store converts them into defaults.

use thiserror::Error;

/// Errors that can occur in a storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The underlying database reported an error
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend refused the operation (permission, quota, ...)
    #[error("Operation rejected: {0}")]
    Rejected(String),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
