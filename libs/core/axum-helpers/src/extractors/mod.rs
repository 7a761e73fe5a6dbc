//! Custom extractors for Axum handlers.

pub mod validated_json;

pub use validated_json::{ValidatedJson, ValidatedQuery};
