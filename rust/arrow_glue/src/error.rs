//! Error types for Arrow Glue operations
//!
//! This module provides the error type returned by every handle accessor.

use thiserror::Error;

use crate::handle::HandleKind;

/// Error types for handle operations
#[derive(Error, Debug)]
pub enum GlueError {
    /// A required pointer was null
    #[error("Null pointer: {0}")]
    NullPointer(String),

    /// An argument was rejected before reaching Arrow
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A C string was not valid UTF-8
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Unknown or already released handle id
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    /// Handle id refers to a different kind of value
    #[error("Handle kind mismatch: expected {expected}, found {actual}")]
    KindMismatch {
        expected: HandleKind,
        actual: HandleKind,
    },

    /// Index-based accessor called past the end
    #[error("Index out of bounds: index {index}, length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Typed accessor called on an array of another type
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Error reported by Arrow
    #[error("Arrow error: {0}")]
    ArrowError(String),
}

impl From<arrow_schema::ArrowError> for GlueError {
    fn from(err: arrow_schema::ArrowError) -> Self {
        GlueError::ArrowError(err.to_string())
    }
}

impl From<std::str::Utf8Error> for GlueError {
    fn from(err: std::str::Utf8Error) -> Self {
        GlueError::InvalidUtf8(err.to_string())
    }
}

/// Result type for handle operations
pub type Result<T> = std::result::Result<T, GlueError>;

/// Check `index` against `len`, the way every index-based accessor does.
pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(GlueError::IndexOutOfBounds { index, len })
    }
}
