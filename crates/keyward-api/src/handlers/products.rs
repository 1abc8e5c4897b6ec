//! Product handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use keyward_core::{Error, ProductId};
use keyward_licensing::{ProductRequest, ProductResponse};
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::AppState;

fn parse_id(id: &str) -> Result<ProductId, ApiError> {
    id.parse()
        .map_err(|_| ApiError(Error::invalid("id", format!("Invalid product ID: {}", id))))
}

pub async fn create_product(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let Json(request) = body?;
    request.validate()?;

    let product = state.products.create(&request).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    Ok(Json(state.products.list().await?))
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.products.get(id).await?))
}

pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<ProductResponse>, ApiError> {
    let id = parse_id(&id)?;
    let Json(request) = body?;
    request.validate()?;

    Ok(Json(state.products.update(id, &request).await?))
}

pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.products.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
