//! Error types for Keyward.

use std::collections::BTreeMap;
use thiserror::Error;

/// Field name to message, collected during request validation.
pub type ValidationErrors = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum Error {
    /// A referenced license or product does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate identifier, or a save that lost a concurrent write.
    #[error("{0}")]
    Conflict(String),

    /// A lifecycle rule rejected the transition.
    #[error("{0}")]
    License(String),

    #[error("Validation failed: {}", join_fields(.0))]
    Validation(ValidationErrors),

    // Infrastructure errors
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Single-field validation failure.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.insert(field.into(), message.into());
        Error::Validation(errors)
    }

    /// Whether the error was caused by the caller rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::Conflict(_) | Error::License(_) | Error::Validation(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

fn join_fields(errors: &ValidationErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("; ")
}
