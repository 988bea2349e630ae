//! Error types for CRD operations

use thiserror::Error;

/// Errors that can occur when working with workflow CRDs
#[derive(Debug, Error)]
pub enum CrdError {
    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Duplicate step id within a workflow
    #[error("Duplicate step id: {0}")]
    DuplicateStepId(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for CRD operations
pub type Result<T> = std::result::Result<T, CrdError>;
