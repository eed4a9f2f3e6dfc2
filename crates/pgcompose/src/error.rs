//! Error types for pgcompose

use thiserror::Error;

/// Result type alias for rendering operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors produced while rendering fragments and statements.
///
/// Composite fragments never wrap the errors of their children: the first
/// failing child's error is returned unchanged, so the variant always names
/// the root cause.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SqlError {
    /// A predicate received a value it cannot compare against
    #[error("Unrenderable value for '{column}': {message}")]
    UnrenderableValue { column: String, message: String },

    /// Structured array encoding received an unsupported shape
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// JSON serialization failed
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A concatenation segment is neither text nor a fragment
    #[error("Invalid segment: {0}")]
    InvalidSegment(String),

    /// Statement builder is structurally incomplete
    #[error("Validation error: {0}")]
    Validation(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SqlError {
    /// Create an unrenderable value error for a specific column
    pub fn unrenderable(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnrenderableValue {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is an unrenderable value error
    pub fn is_unrenderable(&self) -> bool {
        matches!(self, Self::UnrenderableValue { .. })
    }

    /// Check if this is a type mismatch error
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch(_))
    }

    /// Check if this is an encoding error
    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::Encoding(_))
    }
}

impl From<serde_json::Error> for SqlError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}
