//! Mapping storage errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use sheetbase_core::StoreError;

/// Message for any failure reaching the spreadsheet.
pub const UPSTREAM_MESSAGE: &str = "Falha ao aceder aos dados da planilha.";

/// JSON error body: `{"error": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }
}

/// A request failure, rendered as a JSON error response.
#[derive(Debug)]
pub struct ApiError {
    error: StoreError,
    strict: bool,
}

impl ApiError {
    /// `strict` selects 400/404 for client-side failures; otherwise every
    /// failure is a 500, which is what existing clients expect.
    pub fn new(error: StoreError, strict: bool) -> Self {
        Self { error, strict }
    }

    pub fn status(&self) -> StatusCode {
        if !self.strict {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        match self.error {
            StoreError::Validation(_) | StoreError::Json(_) => StatusCode::BAD_REQUEST,
            StoreError::NotFound { .. } | StoreError::RangeNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match &self.error {
            StoreError::Validation(message) => ErrorBody::new(message.clone()),
            StoreError::NotFound { .. } | StoreError::Json(_) => {
                ErrorBody::new(self.error.to_string())
            }
            other => ErrorBody {
                error: UPSTREAM_MESSAGE.to_string(),
                message: Some(other.to_string()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.error {
            StoreError::Validation(_) | StoreError::NotFound { .. } | StoreError::Json(_) => {
                tracing::warn!(error = %self.error, "request rejected");
            }
            _ => tracing::error!(error = %self.error, "spreadsheet access failed"),
        }
        (self.status(), Json(self.body())).into_response()
    }
}
