//! # Axum Helpers
//!
//! Shared HTTP plumbing for the services in this workspace.
//!
//! - **[`server`]**: documented router, health/readiness, graceful shutdown
//! - **[`errors`]**: `AppError` and the uniform `{code, error, message, details}` body
//! - **[`extractors`]**: validated JSON body and query extractors

pub mod errors;
pub mod extractors;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ReadyResponse, ShutdownCoordinator, create_production_app,
    create_router, health_router, run_health_checks,
};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{ValidatedJson, ValidatedQuery};
