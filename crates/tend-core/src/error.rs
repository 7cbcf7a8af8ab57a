//! Crate-level error type.

use thiserror::Error;

use crate::storage::StorageError;
use crate::ui::UiError;

/// Aggregate error for operations that cross the UI and storage seams.
#[derive(Error, Debug)]
pub enum TendError {
    /// User-interaction errors.
    #[error("UI error: {0}")]
    Ui(#[from] UiError),

    /// Storage-related errors.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for tend operations.
pub type Result<T> = std::result::Result<T, TendError>;
