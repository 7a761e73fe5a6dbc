pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Body of every error response.
///
/// ```json
/// {
///   "code": 1004,
///   "error": "NOT_FOUND",
///   "message": "Hotel 0192f0c1... not found"
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    pub message: String,
    /// Structured details, e.g. per-field validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }
}

/// Error type returned by every handler.
///
/// Domain errors convert into this with `From` so handlers can use `?`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON parsing error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Query extraction error: {0}")]
    QueryRejection(#[from] QueryRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),

    /// A backing dependency failed; `code` says which one.
    #[error("{code} upstream failure: {message}")]
    Upstream { code: ErrorCode, message: String },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::JsonExtractorRejection(e) => e.status(),
            AppError::QueryRejection(e) => e.status(),
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable(_) | AppError::Upstream { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::SerdeJson(_) | AppError::Io(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::SerdeJson(_) => ErrorCode::SerdeJsonError,
            AppError::Io(_) => ErrorCode::IoError,
            AppError::JsonExtractorRejection(_) => ErrorCode::InvalidJson,
            AppError::QueryRejection(_) => ErrorCode::InvalidQuery,
            AppError::ValidationError(_) | AppError::BadRequest(_) => ErrorCode::ValidationError,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
            AppError::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
            AppError::Upstream { code, .. } => *code,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(error_code = code.code(), error = %self, "Request failed");
        } else {
            tracing::info!(error_code = code.code(), error = %self, "Request rejected");
        }

        // Internal details stay in the logs
        let (message, details) = match self {
            AppError::JsonExtractorRejection(e) => (e.body_text(), None),
            AppError::QueryRejection(e) => (e.body_text(), None),
            AppError::ValidationError(e) => (
                code.default_message().to_string(),
                Some(validation_details(&e)),
            ),
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::ServiceUnavailable(msg) => (msg, None),
            AppError::Upstream { .. }
            | AppError::SerdeJson(_)
            | AppError::Io(_)
            | AppError::InternalServerError(_) => (code.default_message().to_string(), None),
        };

        let body = ErrorResponse {
            details,
            ..ErrorResponse::new(code, message)
        };

        (status, Json(body)).into_response()
    }
}

/// Field name to list of `{code, message, params}` objects.
pub fn validation_details(errors: &ValidationErrors) -> serde_json::Value {
    serde_json::to_value(errors).unwrap_or(serde_json::Value::Null)
}
