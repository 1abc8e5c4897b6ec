//! Repository implementations for PostgreSQL.

mod license;
mod product;

pub use license::PgLicenseRepository;
pub use product::PgProductRepository;

use keyward_core::Error;

/// Map a sqlx error, turning unique violations into conflicts.
pub(crate) fn map_write_error(err: sqlx::Error, conflict: impl FnOnce() -> String) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => Error::Conflict(conflict()),
        _ => Error::Database(err.to_string()),
    }
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}
