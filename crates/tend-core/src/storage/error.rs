//! Error types for the storage layer.

use thiserror::Error;

/// Errors that can occur in the storage layer.
///
/// A relation lookup that resolves to "no linked record" is not an error;
/// those return `Ok(None)` from the lookup methods. `NotFound` here means a
/// link or id that should resolve does not.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Record or link target not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data error.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The change feed's receive side failed for a reason other than
    /// end-of-stream.
    #[error("Change feed error: {0}")]
    Feed(String),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
