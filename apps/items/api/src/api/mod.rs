use axum::{Router, routing::get};

pub mod health;
pub mod items;

/// API routes without the `/api` prefix; `create_router` adds it.
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new().nest("/items", items::router(state))
}

/// Root-level operational routes: readiness, table bootstrap and metrics.
pub fn ops_router(state: crate::state::AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .route("/init", get(health::init_handler).post(health::init_handler))
        .route("/metrics", get(observability::metrics_handler))
        .with_state(state)
}
