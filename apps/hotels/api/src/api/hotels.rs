use axum::Router;
use domain_hotels::handlers;

pub fn router(state: &crate::state::AppState) -> Router {
    handlers::router(state.hotels.clone())
}
