//! Readiness check against the live Redis connection.

use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};

pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "redis",
        Box::pin(async {
            let mut redis = state.redis.clone();
            database::redis::check_health(&mut redis)
                .await
                .map_err(|e| e.to_string())
        }),
    )];

    run_health_checks(checks).await.into_response()
}
