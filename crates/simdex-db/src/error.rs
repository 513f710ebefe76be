//! Error types for simdex-db.

use thiserror::Error;

/// Result type alias for simdex-db operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
///
/// Local precondition checks (`Validation`, `InvalidArgument`) always run
/// before any client call, so these failures never leave partial backend
/// state. Backend-reported failures are wrapped with the operation and
/// index name, and are never retried here.
#[derive(Debug, Error)]
pub enum StoreError {
    // ========================================================================
    // Local precondition errors
    // ========================================================================
    /// Shape mismatch detected locally (counts, lengths, missing fields).
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// An argument is outside its valid range (e.g. k = 0).
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    // ========================================================================
    // Index lifecycle errors
    // ========================================================================
    /// The named index does not exist in the backend catalog.
    #[error("Index not found: {name}")]
    IndexNotFound { name: String },

    /// The index has not been created yet and ensure-on-write is disabled.
    #[error("Index not ready: {name}")]
    IndexNotReady { name: String },

    // ========================================================================
    // Data errors
    // ========================================================================
    /// A metadata value is not representable in the backend format.
    #[error("Serialization failed: {message}")]
    Serialization { message: String },

    // ========================================================================
    // Backend errors
    // ========================================================================
    /// The backend reported a failure. Carries the original message plus
    /// the operation and index name for diagnosis without a network trace.
    #[error("Backend error during {operation} on index '{index}': {message}")]
    Backend {
        operation: String,
        index: String,
        message: String,
    },

    /// The operation was cancelled by the host environment. Any chunk
    /// already acknowledged by the backend remains committed.
    #[error("Operation cancelled")]
    Cancelled,
}

impl StoreError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an index-not-found error.
    pub fn index_not_found(name: impl Into<String>) -> Self {
        Self::IndexNotFound { name: name.into() }
    }

    /// Create an index-not-ready error.
    pub fn index_not_ready(name: impl Into<String>) -> Self {
        Self::IndexNotReady { name: name.into() }
    }

    /// Create a backend error with operation and index context.
    pub fn backend(
        operation: impl Into<String>,
        index: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Backend {
            operation: operation.into(),
            index: index.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<simdex_core::CoreError> for StoreError {
    fn from(err: simdex_core::CoreError) -> Self {
        match err {
            simdex_core::CoreError::Cancelled => Self::Cancelled,
            other => Self::Backend {
                operation: "embed".to_string(),
                index: String::new(),
                message: other.to_string(),
            },
        }
    }
}
