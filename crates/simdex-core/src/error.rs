//! Error types for simdex-core.

use thiserror::Error;

/// Result type alias for simdex-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the domain layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Embedding generation failed.
    #[error("Embedding generation failed: {message}")]
    Embedding { message: String },

    /// The operation was cancelled by the host environment.
    #[error("Operation cancelled")]
    Cancelled,
}

impl CoreError {
    /// Create an embedding error.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }
}
