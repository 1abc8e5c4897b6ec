//! HTTP API server for Keyward.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorDetails};
pub use routes::create_router;
pub use state::AppState;

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Router with request tracing, request IDs and CORS applied.
pub fn build_app(state: Arc<AppState>) -> Router {
    create_router(state)
        .layer(axum::middleware::from_fn(middleware::request_id))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer())
}
