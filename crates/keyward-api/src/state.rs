//! Application state shared across handlers.

use keyward_core::clock::{Clock, SystemClock};
use keyward_core::ports::{LicenseRepository, ProductRepository};
use keyward_db::{Database, MemoryStore};
use keyward_licensing::{LicenseService, ProductService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub licenses: Arc<LicenseService>,
    pub products: ProductService,
    /// Also used for request validation so "future" means the same instant
    /// the engine sees.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        licenses: Arc<dyn LicenseRepository>,
        products: Arc<dyn ProductRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            licenses: Arc::new(
                LicenseService::new(licenses, products.clone()).with_clock(clock.clone()),
            ),
            products: ProductService::new(products),
            clock,
        }
    }

    /// State backed by PostgreSQL.
    pub fn from_database(db: &Database) -> Self {
        Self::new(
            Arc::new(db.licenses()),
            Arc::new(db.products()),
            Arc::new(SystemClock),
        )
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, clock)
    }
}
