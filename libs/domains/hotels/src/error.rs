use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use thiserror::Error;

use crate::models::HotelId;

#[derive(Debug, Error)]
pub enum HotelError {
    #[error("Hotel not found: {0}")]
    NotFound(HotelId),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// Vector index missing, unreachable, or replied with something unparseable
    #[error("Similarity query failed: {0}")]
    Query(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Record store unreachable or returned a malformed document
    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HotelResult<T> = Result<T, HotelError>;

impl From<validator::ValidationErrors> for HotelError {
    fn from(errors: validator::ValidationErrors) -> Self {
        HotelError::Validation(errors.to_string())
    }
}

impl From<reqwest::Error> for HotelError {
    fn from(err: reqwest::Error) -> Self {
        HotelError::Embedding(err.to_string())
    }
}

/// Convert HotelError to AppError for standardized error responses
impl From<HotelError> for AppError {
    fn from(err: HotelError) -> Self {
        match err {
            HotelError::NotFound(id) => AppError::NotFound(format!("Hotel {} not found", id)),
            HotelError::Validation(msg) => AppError::BadRequest(msg),
            HotelError::Query(message) => AppError::Upstream {
                code: ErrorCode::SearchUnavailable,
                message,
            },
            HotelError::Embedding(message) => AppError::Upstream {
                code: ErrorCode::EmbeddingUnavailable,
                message,
            },
            HotelError::Store(message) => AppError::Upstream {
                code: ErrorCode::StoreUnavailable,
                message,
            },
            HotelError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for HotelError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
