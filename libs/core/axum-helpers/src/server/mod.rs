//! Server setup: documented router, health endpoints, graceful shutdown.
//!
//! ```ignore
//! let router = create_router::<ApiDoc>(api_routes, &config.server, &config.environment)?
//!     .merge(health_router(app_info!()));
//! create_production_app(router, &config.server, Duration::from_secs(30), cleanup).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_production_app, create_router};
pub use health::{
    HealthCheckFuture, HealthResponse, ReadyResponse, health_router, run_health_checks,
};
pub use shutdown::ShutdownCoordinator;
