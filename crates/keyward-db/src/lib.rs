//! Storage layer for Keyward.
//!
//! PostgreSQL repositories for production and an in-memory store for
//! development and tests. Both implement the ports from `keyward_core`.

pub mod memory;
pub mod repositories;

pub use memory::MemoryStore;
pub use repositories::*;

use keyward_core::Result;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::info;

/// Default pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Database connection pool.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to the database.
    pub async fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with(database_url, DEFAULT_MAX_CONNECTIONS).await
    }

    /// Connect with an explicit pool size.
    pub async fn connect_with(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(|e| keyward_core::Error::Database(e.to_string()))?;

        info!(max_connections, "Connected to database");
        Ok(Self { pool })
    }

    /// Get the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// License repository backed by this pool.
    pub fn licenses(&self) -> PgLicenseRepository {
        PgLicenseRepository::new(self.pool.clone())
    }

    /// Product repository backed by this pool.
    pub fn products(&self) -> PgProductRepository {
        PgProductRepository::new(self.pool.clone())
    }

    /// Run migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| keyward_core::Error::Database(e.to_string()))?;
        info!("Database migrations applied");
        Ok(())
    }
}
