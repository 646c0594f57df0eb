use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;

/// Assembles the full router (spec.md §4.7), mirroring the route-to-
/// handler wiring style of `riptide-api::main`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/pdf2img", post(handlers::convert))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/workers", get(handlers::workers))
        .with_state(state)
}
