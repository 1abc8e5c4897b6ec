//! Maps domain errors to HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use keyward_core::{Error, ValidationErrors};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<ValidationErrors>,
}

#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::License(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Database(_) | Error::Serialization(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(Error::invalid("body", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = status.canonical_reason().unwrap_or("Error").to_string();

        let (message, validation_errors) = match self.0 {
            Error::Validation(errors) => ("Validation failed".to_string(), Some(errors)),
            err if err.is_client_error() => (err.to_string(), None),
            err => {
                error!(error = %err, "Request failed");
                ("An unexpected error occurred.".to_string(), None)
            }
        };

        let body = ErrorDetails {
            timestamp: Utc::now(),
            message,
            details,
            validation_errors,
        };
        (status, Json(body)).into_response()
    }
}
