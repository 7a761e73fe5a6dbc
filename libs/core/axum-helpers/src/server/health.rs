use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use core_config::AppInfo;
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// "ready" or "not ready"
    pub status: &'static str,
    /// Check name to "connected" / "disconnected"
    pub checks: BTreeMap<String, &'static str>,
}

/// A boxed readiness check with a string error
pub type HealthCheckFuture<'a> = Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>;

/// Run checks concurrently; 200 when all pass, 503 otherwise.
///
/// ```ignore
/// let checks: Vec<(&str, HealthCheckFuture)> = vec![(
///     "redis",
///     Box::pin(async move { check_health(&mut conn).await.map_err(|e| e.to_string()) }),
/// )];
/// run_health_checks(checks).await
/// ```
pub async fn run_health_checks(
    checks: Vec<(&str, HealthCheckFuture<'_>)>,
) -> (StatusCode, Json<ReadyResponse>) {
    let (names, pending): (Vec<_>, Vec<_>) = checks.into_iter().unzip();
    let results = join_all(pending).await;

    let mut all_ready = true;
    let checks = names
        .into_iter()
        .zip(results)
        .map(|(name, result)| {
            let state = match result {
                Ok(()) => "connected",
                Err(e) => {
                    tracing::error!(check = name, error = %e, "Readiness check failed");
                    all_ready = false;
                    "disconnected"
                }
            };
            (name.to_string(), state)
        })
        .collect();

    let (status, label) = if all_ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready")
    };

    (
        status,
        Json(ReadyResponse {
            status: label,
            checks,
        }),
    )
}

/// Liveness: always 200 while the process is serving.
pub async fn health_handler(State(app): State<AppInfo>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        name: app.name,
        version: app.version,
    })
}

/// `/health` route carrying the binary's name and version.
pub fn health_router(app_info: AppInfo) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(app_info)
}
