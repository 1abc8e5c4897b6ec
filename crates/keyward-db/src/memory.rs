//! In-memory store implementing both repository ports.
//!
//! Mirrors the PostgreSQL schema rules: unique license keys, unique product
//! names, a license must reference an existing product, deleting a product
//! cascades to its licenses, and saves are checked against the stored
//! revision.

use async_trait::async_trait;
use chrono::Utc;
use keyward_core::ids::{LicenseId, ProductId};
use keyward_core::license::License;
use keyward_core::ports::{LicenseRepository, ProductRepository};
use keyward_core::product::Product;
use keyward_core::{Error, Result};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Default)]
struct State {
    products: HashMap<ProductId, Product>,
    licenses: HashMap<LicenseId, License>,
}

impl State {
    fn with_product_name(&self, mut license: License) -> License {
        if let Some(product) = self.products.get(&license.product_id) {
            license.product_name = product.name.clone();
        }
        license
    }

    fn license_by_key(&self, license_key: &str) -> Option<&License> {
        self.licenses
            .values()
            .find(|license| license.license_key == license_key)
    }
}

/// Store holding products and licenses in process memory.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|e| Error::Internal(format!("Store lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|e| Error::Internal(format!("Store lock poisoned: {}", e)))
    }
}

#[async_trait]
impl LicenseRepository for MemoryStore {
    async fn save(&self, license: &License) -> Result<License> {
        let mut state = self.write()?;

        if !state.products.contains_key(&license.product_id) {
            return Err(Error::NotFound(format!(
                "Product not found with id: {}",
                license.product_id
            )));
        }

        match state.licenses.get(&license.id) {
            None if license.revision != 0 => {
                return Err(Error::NotFound(format!(
                    "License not found with key: {}",
                    license.license_key
                )));
            }
            None => {
                if state.license_by_key(&license.license_key).is_some() {
                    return Err(Error::Conflict(format!(
                        "License key already exists: {}",
                        license.license_key
                    )));
                }
            }
            Some(stored) if stored.revision != license.revision => {
                return Err(Error::Conflict(format!(
                    "License {} was modified concurrently",
                    license.license_key
                )));
            }
            Some(_) => {}
        }

        let mut saved = license.clone();
        saved.revision = license.revision + 1;
        saved.updated_at = Utc::now();
        let saved = state.with_product_name(saved);
        state.licenses.insert(saved.id, saved.clone());

        debug!(license_key = %saved.license_key, revision = saved.revision, "License saved");
        Ok(saved)
    }

    async fn find_by_key(&self, license_key: &str) -> Result<Option<License>> {
        let state = self.read()?;
        Ok(state
            .license_by_key(license_key)
            .cloned()
            .map(|license| state.with_product_name(license)))
    }

    async fn find_by_key_and_product_name(
        &self,
        license_key: &str,
        product_name: &str,
    ) -> Result<Option<License>> {
        let state = self.read()?;
        Ok(state
            .license_by_key(license_key)
            .filter(|license| {
                state
                    .products
                    .get(&license.product_id)
                    .is_some_and(|product| product.name == product_name)
            })
            .cloned()
            .map(|license| state.with_product_name(license)))
    }

    async fn find_all(&self) -> Result<Vec<License>> {
        let state = self.read()?;
        let mut licenses: Vec<License> = state
            .licenses
            .values()
            .cloned()
            .map(|license| state.with_product_name(license))
            .collect();
        licenses.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(licenses)
    }

    async fn delete(&self, license: &License) -> Result<()> {
        self.write()?.licenses.remove(&license.id);
        Ok(())
    }

    async fn exists_by_key(&self, license_key: &str) -> Result<bool> {
        Ok(self.read()?.license_by_key(license_key).is_some())
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn create(&self, product: &Product) -> Result<Product> {
        let mut state = self.write()?;
        if state.products.values().any(|p| p.name == product.name) {
            return Err(Error::Conflict(format!(
                "Product with name '{}' already exists.",
                product.name
            )));
        }
        state.products.insert(product.id, product.clone());
        Ok(product.clone())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Product>> {
        Ok(self
            .read()?
            .products
            .values()
            .find(|product| product.name == name)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self.read()?.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn update(&self, product: &Product) -> Result<Product> {
        let mut state = self.write()?;
        if state
            .products
            .values()
            .any(|p| p.name == product.name && p.id != product.id)
        {
            return Err(Error::Conflict(format!(
                "Product with name '{}' already exists.",
                product.name
            )));
        }

        let stored = state
            .products
            .get_mut(&product.id)
            .ok_or_else(|| Error::NotFound(format!("Product not found with id: {}", product.id)))?;
        stored.name = product.name.clone();
        stored.description = product.description.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: ProductId) -> Result<()> {
        let mut state = self.write()?;
        if state.products.remove(&id).is_some() {
            let before = state.licenses.len();
            state.licenses.retain(|_, license| license.product_id != id);
            debug!(product_id = %id, removed = before - state.licenses.len(), "Cascaded license delete");
        }
        Ok(())
    }
}
