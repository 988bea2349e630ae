//! Error types for dynamic resource access

use bosun_common::PathError;
use thiserror::Error;

/// Errors from the dynamic resource client
#[derive(Debug, Error)]
pub enum DynamicError {
    /// `apiVersion` is not `group/version` or `version`
    #[error("invalid apiVersion {0:?}")]
    InvalidApiVersion(String),

    /// The requested object does not exist
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: String,
        namespace: String,
        name: String,
    },

    /// Selector traversal failed (absent segment or wrong node shape)
    #[error("selector error: {0}")]
    Selector(#[from] PathError),

    /// Kubernetes API or transport failure
    #[error(transparent)]
    Kube(#[from] kube::Error),

    /// Object could not be serialized for traversal
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Secret exists but the requested key is absent
    #[error("secret {namespace}/{name} has no key {key:?}")]
    MissingSecretKey {
        namespace: String,
        name: String,
        key: String,
    },

    /// Secret data is not valid base64
    #[error("invalid base64 in secret value: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded secret bytes are not UTF-8
    #[error("secret value is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl DynamicError {
    /// True when the error means "the object does not exist", whichever
    /// layer reported it.
    pub fn is_not_found(&self) -> bool {
        match self {
            DynamicError::NotFound { .. } => true,
            DynamicError::Kube(kube::Error::Api(ae)) => ae.code == 404,
            _ => false,
        }
    }
}

/// Result type for dynamic client operations
pub type Result<T> = std::result::Result<T, DynamicError>;
