//! API route definitions.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::handlers::{health, licenses, products};
use crate::state::AppState;

/// Create the main API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/licenses", license_routes())
        .nest("/products", product_routes())
}

fn license_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(licenses::list_licenses).post(licenses::create_license),
        )
        .route("/activate", post(licenses::activate_license))
        .route("/validate", post(licenses::validate_license))
        .route(
            "/{license_key}",
            get(licenses::get_license)
                .put(licenses::update_license)
                .delete(licenses::delete_license),
        )
}

fn product_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
}
