//! Error types for the core primitives.

use thiserror::Error;

/// Errors raised while decoding or validating core data types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Malformed input data
    #[error("invalid format: {message}")]
    InvalidFormat { message: String },

    /// Reader ran out of bytes
    #[error("unexpected end of stream at position {position}")]
    EndOfStream { position: usize },

    /// Base58 decoding or checksum failure
    #[error("invalid base58 string: {message}")]
    InvalidBase58 { message: String },

    /// A length or numeric value outside its permitted range
    #[error("value out of range: {message}")]
    OutOfRange { message: String },
}

impl CoreError {
    /// Creates a new invalid format error.
    pub fn invalid_format<S: Into<String>>(message: S) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates a new end of stream error.
    pub fn end_of_stream(position: usize) -> Self {
        Self::EndOfStream { position }
    }

    /// Creates a new base58 error.
    pub fn invalid_base58<S: Into<String>>(message: S) -> Self {
        Self::InvalidBase58 {
            message: message.into(),
        }
    }

    /// Creates a new out of range error.
    pub fn out_of_range<S: Into<String>>(message: S) -> Self {
        Self::OutOfRange {
            message: message.into(),
        }
    }
}

/// Result type for core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
