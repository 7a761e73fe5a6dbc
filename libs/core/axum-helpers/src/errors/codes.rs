//! Error codes carried in every error body.
//!
//! Each code has a string identifier for clients, an integer for log
//! correlation and a default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000s)
    ValidationError,
    InvalidJson,
    InvalidQuery,
    NotFound,
    MethodNotAllowed,

    // Server errors
    InternalError,
    ServiceUnavailable,

    // Backing service errors (2000s)
    /// Document store unreachable or returned an unexpected reply
    StoreUnavailable,
    /// Vector index query failed
    SearchUnavailable,
    /// Embedding provider failed
    EmbeddingUnavailable,

    IoError,
    SerdeJsonError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidJson => "INVALID_JSON",
            Self::InvalidQuery => "INVALID_QUERY",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::SearchUnavailable => "SEARCH_UNAVAILABLE",
            Self::EmbeddingUnavailable => "EMBEDDING_UNAVAILABLE",
            Self::IoError => "IO_ERROR",
            Self::SerdeJsonError => "SERDE_JSON_ERROR",
        }
    }

    pub const fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidJson => 1002,
            Self::InvalidQuery => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::ServiceUnavailable => 1006,
            Self::MethodNotAllowed => 1007,
            Self::StoreUnavailable => 2001,
            Self::SearchUnavailable => 2002,
            Self::EmbeddingUnavailable => 2003,
            Self::IoError => 4001,
            Self::SerdeJsonError => 5001,
        }
    }

    pub const fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidJson => "Invalid JSON body",
            Self::InvalidQuery => "Invalid query parameters",
            Self::NotFound => "Resource not found",
            Self::MethodNotAllowed => "The HTTP method is not allowed for this resource",
            Self::InternalError => "An internal server error occurred",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::StoreUnavailable => "The document store is unavailable",
            Self::SearchUnavailable => "The similarity search is unavailable",
            Self::EmbeddingUnavailable => "The embedding provider is unavailable",
            Self::IoError => "An I/O error occurred",
            Self::SerdeJsonError => "Failed to process JSON data",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_matches_as_str() {
        for code in [
            ErrorCode::ValidationError,
            ErrorCode::SearchUnavailable,
            ErrorCode::EmbeddingUnavailable,
            ErrorCode::MethodNotAllowed,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_backing_service_codes_are_in_2000_range() {
        for code in [
            ErrorCode::StoreUnavailable,
            ErrorCode::SearchUnavailable,
            ErrorCode::EmbeddingUnavailable,
        ] {
            assert!((2000..3000).contains(&code.code()));
        }
    }
}
