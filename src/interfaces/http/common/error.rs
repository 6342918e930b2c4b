//! Mapping of domain errors onto HTTP responses
//!
//! Every error body has the same shape:
//!
//! ```json
//! {"code": "VALIDATION_FAILED", "message": "...", "field": "campus"}
//! ```
//!
//! `code` is stable and meant for clients to match on; `message` may change.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::domain::DomainError;

pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const INVALID_JSON: &str = "INVALID_JSON";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    /// Offending input field, for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorBody {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Handler error: a [`DomainError`] rendered as JSON with a matching status.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match &self.0 {
            DomainError::NotFound { .. } => error_code::NOT_FOUND,
            DomainError::Validation { .. } => error_code::VALIDATION_FAILED,
            DomainError::Conflict(_) => error_code::ALREADY_EXISTS,
            DomainError::Storage(_) => error_code::STORAGE_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self.0 {
            DomainError::Validation { field, reason } => {
                ErrorBody::new(self.error_code(), format!("{}: {}", field, reason))
                    .with_field(*field)
            }
            DomainError::Storage(msg) => {
                error!(error = %msg, "Storage failure while handling request");
                ErrorBody::new(self.error_code(), "Internal storage error")
            }
            other => ErrorBody::new(self.error_code(), other.to_string()),
        };
        debug!(status = status.as_u16(), code = %body.code, "Request failed");
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            ApiError(DomainError::pos_not_found(1)).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(DomainError::validation("type", "unknown")).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError(DomainError::Conflict("dup".into())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError(DomainError::Storage("down".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_code_mapping() {
        assert_eq!(ApiError(DomainError::pos_not_found(1)).error_code(), "NOT_FOUND");
        assert_eq!(
            ApiError(DomainError::Conflict("dup".into())).error_code(),
            "ALREADY_EXISTS"
        );
    }

    #[tokio::test]
    async fn validation_body_carries_field() {
        let resp = ApiError(DomainError::validation("campus", "unknown campus 'X'")).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.code, "VALIDATION_FAILED");
        assert_eq!(body.field.as_deref(), Some("campus"));
    }

    #[tokio::test]
    async fn storage_details_are_not_leaked() {
        let resp = ApiError(DomainError::Storage("password=hunter2".into())).into_response();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert!(!body.message.contains("hunter2"));
    }
}
