//! PostgreSQL implementation of LicenseRepository.

use super::{is_foreign_key_violation, map_write_error};
use async_trait::async_trait;
use chrono::Utc;
use keyward_core::ids::{LicenseId, ProductId};
use keyward_core::license::{License, LicenseStatus};
use keyward_core::ports::LicenseRepository;
use keyward_core::{Error, Result};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::debug;

const SELECT_LICENSE: &str = "SELECT l.id, l.license_key, l.product_id, p.name AS product_name, l.licensed_to, l.issue_date, l.expiration_date, l.status, l.enabled_features, l.max_users, l.hardware_id, l.activation_date, l.revision, l.created_at, l.updated_at FROM licenses l JOIN products p ON p.id = l.product_id";

/// PostgreSQL implementation of LicenseRepository.
///
/// Saves run in a transaction that locks the target row and compares its
/// revision before writing, so of two writers that loaded the same revision
/// only the first succeeds.
#[derive(Clone)]
pub struct PgLicenseRepository {
    pool: PgPool,
}

impl PgLicenseRepository {
    /// Create a new PgLicenseRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_license(r: &sqlx::postgres::PgRow) -> Result<License> {
        let status_str: String = r.get("status");
        let status: LicenseStatus = status_str.parse().map_err(Error::Database)?;
        let features: Vec<String> = r.get("enabled_features");
        let max_users: Option<i32> = r.get("max_users");

        Ok(License {
            id: LicenseId::from_uuid(r.get::<uuid::Uuid, _>("id")),
            license_key: r.get("license_key"),
            product_id: ProductId::from_uuid(r.get::<uuid::Uuid, _>("product_id")),
            product_name: r.get("product_name"),
            licensed_to: r.get("licensed_to"),
            issue_date: r.get("issue_date"),
            expiration_date: r.get("expiration_date"),
            status,
            enabled_features: features.into_iter().collect(),
            max_users: max_users.and_then(|m| u32::try_from(m).ok()),
            hardware_id: r.get("hardware_id"),
            activation_date: r.get("activation_date"),
            revision: r.get("revision"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        })
    }

    fn max_users_column(license: &License) -> Result<Option<i32>> {
        license
            .max_users
            .map(i32::try_from)
            .transpose()
            .map_err(|_| Error::invalid("maxUsers", "Max users is too large"))
    }

    async fn insert(tx: &mut Transaction<'_, Postgres>, license: &License) -> Result<()> {
        let features: Vec<String> = license.enabled_features.iter().cloned().collect();
        sqlx::query("INSERT INTO licenses (id, license_key, product_id, licensed_to, issue_date, expiration_date, status, enabled_features, max_users, hardware_id, activation_date, revision, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)")
            .bind(license.id.as_uuid())
            .bind(&license.license_key)
            .bind(license.product_id.as_uuid())
            .bind(&license.licensed_to)
            .bind(license.issue_date)
            .bind(license.expiration_date)
            .bind(license.status.as_str())
            .bind(&features)
            .bind(Self::max_users_column(license)?)
            .bind(&license.hardware_id)
            .bind(license.activation_date)
            .bind(license.revision)
            .bind(license.created_at)
            .bind(license.updated_at)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    return Error::NotFound(format!(
                        "Product not found with id: {}",
                        license.product_id
                    ));
                }
                map_write_error(e, || {
                    format!("License key already exists: {}", license.license_key)
                })
            })?;
        Ok(())
    }

    async fn update(tx: &mut Transaction<'_, Postgres>, license: &License) -> Result<()> {
        let features: Vec<String> = license.enabled_features.iter().cloned().collect();
        sqlx::query("UPDATE licenses SET product_id = $2, licensed_to = $3, issue_date = $4, expiration_date = $5, status = $6, enabled_features = $7, max_users = $8, hardware_id = $9, activation_date = $10, revision = $11, updated_at = $12 WHERE id = $1")
            .bind(license.id.as_uuid())
            .bind(license.product_id.as_uuid())
            .bind(&license.licensed_to)
            .bind(license.issue_date)
            .bind(license.expiration_date)
            .bind(license.status.as_str())
            .bind(&features)
            .bind(Self::max_users_column(license)?)
            .bind(&license.hardware_id)
            .bind(license.activation_date)
            .bind(license.revision)
            .bind(license.updated_at)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    return Error::NotFound(format!(
                        "Product not found with id: {}",
                        license.product_id
                    ));
                }
                Error::Database(e.to_string())
            })?;
        Ok(())
    }
}

#[async_trait]
impl LicenseRepository for PgLicenseRepository {
    async fn save(&self, license: &License) -> Result<License> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let stored: Option<i64> =
            sqlx::query_scalar("SELECT revision FROM licenses WHERE id = $1 FOR UPDATE")
                .bind(license.id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| Error::Database(e.to_string()))?;

        let mut saved = license.clone();
        saved.revision = license.revision + 1;
        saved.updated_at = Utc::now();

        match stored {
            None if license.revision == 0 => Self::insert(&mut tx, &saved).await?,
            None => {
                return Err(Error::NotFound(format!(
                    "License not found with key: {}",
                    license.license_key
                )));
            }
            Some(revision) if revision != license.revision => {
                return Err(Error::Conflict(format!(
                    "License {} was modified concurrently",
                    license.license_key
                )));
            }
            Some(_) => Self::update(&mut tx, &saved).await?,
        }

        tx.commit()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        debug!(license_key = %saved.license_key, revision = saved.revision, "License saved");
        Ok(saved)
    }

    async fn find_by_key(&self, license_key: &str) -> Result<Option<License>> {
        let row = sqlx::query(&format!("{} WHERE l.license_key = $1", SELECT_LICENSE))
            .bind(license_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        row.as_ref().map(Self::row_to_license).transpose()
    }

    async fn find_by_key_and_product_name(
        &self,
        license_key: &str,
        product_name: &str,
    ) -> Result<Option<License>> {
        let row = sqlx::query(&format!(
            "{} WHERE l.license_key = $1 AND p.name = $2",
            SELECT_LICENSE
        ))
        .bind(license_key)
        .bind(product_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        row.as_ref().map(Self::row_to_license).transpose()
    }

    async fn find_all(&self) -> Result<Vec<License>> {
        let rows = sqlx::query(&format!("{} ORDER BY l.created_at, l.id", SELECT_LICENSE))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        rows.iter().map(Self::row_to_license).collect()
    }

    async fn delete(&self, license: &License) -> Result<()> {
        sqlx::query("DELETE FROM licenses WHERE id = $1")
            .bind(license.id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    async fn exists_by_key(&self, license_key: &str) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM licenses WHERE license_key = $1)")
            .bind(license_key)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }
}
