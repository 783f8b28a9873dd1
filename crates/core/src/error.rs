//! Error types for sheetbase.

use thiserror::Error;

/// Result type for sheetbase operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while serving a request against the spreadsheet.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required parameter or field is missing, or the request is malformed.
    #[error("{0}")]
    Validation(String),

    /// A record lookup by id found nothing.
    #[error("{entity} com ID '{id}' não encontrado.")]
    NotFound { entity: String, id: String },

    /// The requested range or sheet does not exist.
    #[error("Range not found: {0}")]
    RangeNotFound(String),

    /// The storage service rejected or failed a call.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Obtaining credentials for the storage service failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error (should not happen).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not-found error for an entity kind and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an upstream error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    /// Whether the failure came from the storage service or its credentials.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::Auth(_))
    }
}
