use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::{method_not_allowed, not_found};
use axum::Router;
use axum::http::{HeaderValue, Method, StatusCode, header};
use core_config::Environment;
use core_config::server::ServerConfig;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Wrap the API routes with documentation and cross-cutting layers.
///
/// - Swagger UI at `/swagger-ui`, spec at `/api-docs/openapi.json`
/// - `apis` nested under `/api`
/// - request tracing, a per-request timeout (408 on expiry), CORS, compression
/// - JSON 404 fallback, JSON 405 for known API paths with the wrong method
///
/// CORS origins come from `server_config.cors_allowed_origins`. An empty list
/// is allowed in development (any origin) and rejected in production.
pub fn create_router<T>(
    apis: Router,
    server_config: &ServerConfig,
    environment: &Environment,
) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let cors = cors_layer(&server_config.cors_allowed_origins, environment)?;

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .nest("/api", apis)
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            server_config.request_timeout,
        ))
        .layer(cors)
        .layer(CompressionLayer::new());

    Ok(router)
}

fn cors_layer(origins: &[String], environment: &Environment) -> io::Result<CorsLayer> {
    if origins.is_empty() {
        if environment.is_production() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "CORS_ALLOWED_ORIGIN is required in production. Example: CORS_ALLOWED_ORIGIN=https://hotels.example.com",
            ));
        }
        warn!("CORS_ALLOWED_ORIGIN not set, accepting any origin");
        return Ok(CorsLayer::permissive());
    }

    let allowed = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {e}"),
            )
        })?;

    info!(origins = ?origins, "CORS configured");

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600)))
}

/// Serve with coordinated shutdown: on the first signal, stop accepting
/// connections, let in-flight requests drain, then run `cleanup` bounded by
/// `shutdown_timeout`.
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let coordinator = ShutdownCoordinator::new();
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let signal_watcher = coordinator.clone();
    tokio::spawn(async move { signal_watcher.wait_for_signal().await });

    let drained = coordinator.clone();
    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { drained.wait_for_shutdown().await })
        .await
        .inspect_err(|e| tracing::error!("Server encountered an error: {:?}", e));

    info!(timeout = ?shutdown_timeout, "Running cleanup");
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed"),
        Err(_) => warn!(timeout = ?shutdown_timeout, "Cleanup timed out, forcing shutdown"),
    }

    serve_result
}
