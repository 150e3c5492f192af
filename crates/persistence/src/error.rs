//! Error types for store operations.

use thiserror::Error;

/// Errors raised by stores and the state overlay.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Commit was requested on the base overlay layer
    #[error("no parent layer to commit into")]
    NoParentLayer,

    /// Backend failure reported by a store implementation
    #[error("store backend error: {message}")]
    Backend { message: String },
}

impl StoreError {
    /// Creates a new backend error.
    pub fn backend<S: Into<String>>(message: S) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
