use axum::Router;

pub mod health;
pub mod hotels;

/// API routes without the `/api` prefix; `create_router` adds it.
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new().nest("/v1/hotels", hotels::router(state))
}

/// `/ready` with real dependency checks, merged next to the stateless app router.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
