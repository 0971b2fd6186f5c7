//! # API Errors
//!
//! Error type returned by route handlers. Every error renders as JSON:
//! `{"error": "...", "code": 404}`, with `details` added for validation
//! failures.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::render::RenderError;
use crate::schema::{LocSegment, SchemaError, ValidationIssue};
use crate::store::StoreError;

/// Result type for route handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Request is well-formed but cannot be served
    #[error("{0}")]
    BadRequest(String),

    /// Payload failed schema validation
    #[error("{0}")]
    Validation(#[from] SchemaError),

    // ==================
    // Server Errors (5xx)
    // ==================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::EmptyBatch | StoreError::IdsExhausted(_) => {
                ApiError::BadRequest(err.to_string())
            }
            StoreError::Poisoned => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

// Extractor rejections are reported like any other schema violation.

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        let loc = vec![LocSegment::from("path"), LocSegment::from("id")];
        ApiError::Validation(SchemaError::single(loc, rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(_: QueryRejection) -> Self {
        // `number` is the only query parameter
        let loc = vec![LocSegment::from("query"), LocSegment::from("number")];
        ApiError::Validation(SchemaError::single(loc, "value is not a valid integer"))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let loc = vec![LocSegment::from("body")];
        ApiError::Validation(SchemaError::single(loc, rejection.body_text()))
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationIssue>>,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        let code = err.status_code().as_u16();
        let error = err.to_string();
        let details = match err {
            ApiError::Validation(schema_err) => Some(schema_err.issues),
            _ => None,
        };
        Self {
            error,
            code,
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}
