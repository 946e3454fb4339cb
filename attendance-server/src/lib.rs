//! HTTP API for the attendance portal.

pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// All routes, with CORS open to any origin and per-request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::time::router())
        .merge(routes::profiles::router())
        .merge(routes::events::router())
        .merge(routes::notify::router())
        .merge(routes::admin::router())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
