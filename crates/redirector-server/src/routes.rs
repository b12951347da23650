//! Route definitions.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{handlers, state::AppState};

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/healthz", get(handlers::health_check))
        // Metrics endpoint
        .route("/metrics", get(handlers::metrics_endpoint))
        // Redirects
        .route("/redirect/:pool_id/", get(handlers::redirect_root))
        .route("/redirect/:pool_id/*path", get(handlers::redirect))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
