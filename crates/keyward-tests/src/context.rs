//! Test context backed by a fresh PostgreSQL container.

use crate::containers::PostgresContainer;
use keyward_db::Database;

/// Migrated database in its own container. Drop this to stop it.
pub struct TestContext {
    pub postgres: PostgresContainer,
    pub db: Database,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        crate::init_test_logging();

        let postgres = PostgresContainer::start().await?;
        let db = Database::connect(postgres.connection_string()).await?;
        db.migrate().await?;

        Ok(Self { postgres, db })
    }

    /// Get database connection string.
    pub fn db_url(&self) -> &str {
        self.postgres.connection_string()
    }
}
