//! License handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use keyward_licensing::{ActivationRequest, LicenseRequest, LicenseResponse};
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_license(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LicenseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LicenseResponse>), ApiError> {
    let Json(request) = body?;
    request.validate(state.clock.now())?;

    let license = state.licenses.create(&request).await?;
    Ok((StatusCode::CREATED, Json(license)))
}

pub async fn list_licenses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LicenseResponse>>, ApiError> {
    Ok(Json(state.licenses.list().await?))
}

pub async fn get_license(
    State(state): State<Arc<AppState>>,
    Path(license_key): Path<String>,
) -> Result<Json<LicenseResponse>, ApiError> {
    Ok(Json(state.licenses.get(&license_key).await?))
}

pub async fn update_license(
    State(state): State<Arc<AppState>>,
    Path(license_key): Path<String>,
    body: Result<Json<LicenseRequest>, JsonRejection>,
) -> Result<Json<LicenseResponse>, ApiError> {
    let Json(request) = body?;
    request.validate(state.clock.now())?;

    Ok(Json(state.licenses.update(&license_key, &request).await?))
}

pub async fn delete_license(
    State(state): State<Arc<AppState>>,
    Path(license_key): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.licenses.delete(&license_key).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn activate_license(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ActivationRequest>, JsonRejection>,
) -> Result<Json<LicenseResponse>, ApiError> {
    let Json(request) = body?;
    request.validate()?;

    Ok(Json(state.licenses.activate(&request).await?))
}

pub async fn validate_license(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ActivationRequest>, JsonRejection>,
) -> Result<Json<LicenseResponse>, ApiError> {
    let Json(request) = body?;
    request.validate()?;

    Ok(Json(state.licenses.validate(&request).await?))
}
