//! Error types for n1ql-builder

use thiserror::Error;

/// Result type alias for interpreter and builder operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Error types for query interpretation and rendering
#[derive(Debug, Error)]
pub enum QueryError {
    /// Missing or malformed argument to a builder operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A directive appeared somewhere it cannot be attached
    #[error("Directive `{0}` requires a field context")]
    DirectivePlacement(String),

    /// An operator key outside the recognized directive set
    #[error("Unknown directive: {0}")]
    UnknownDirective(String),

    /// A comparison operator name outside the recognized set
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
}

impl QueryError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an unknown directive error for a raw key
    pub fn unknown_directive(key: impl Into<String>) -> Self {
        Self::UnknownDirective(key.into())
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is a directive placement error
    pub fn is_directive_placement(&self) -> bool {
        matches!(self, Self::DirectivePlacement(_))
    }
}
