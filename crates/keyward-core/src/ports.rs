//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the lifecycle engine and the
//! storage adapters.

use crate::ids::ProductId;
use crate::license::License;
use crate::product::Product;
use crate::Result;
use async_trait::async_trait;

/// Store for license records.
///
/// Licenses are keyed by their unique license key and reference exactly one
/// product by id. Implementations must enforce key uniqueness and reject a
/// save whose `revision` does not match the stored record, returning
/// [`crate::Error::Conflict`] in both cases.
#[async_trait]
pub trait LicenseRepository: Send + Sync {
    /// Insert or update a license. Returns the stored record with its
    /// revision advanced.
    async fn save(&self, license: &License) -> Result<License>;

    /// Get a license by key.
    async fn find_by_key(&self, license_key: &str) -> Result<Option<License>>;

    /// Get a license by key, only if it belongs to the named product.
    async fn find_by_key_and_product_name(
        &self,
        license_key: &str,
        product_name: &str,
    ) -> Result<Option<License>>;

    /// List all licenses, oldest first.
    async fn find_all(&self) -> Result<Vec<License>>;

    /// Permanently remove a license.
    async fn delete(&self, license: &License) -> Result<()>;

    /// Check whether a key is taken.
    async fn exists_by_key(&self, license_key: &str) -> Result<bool>;
}

/// Store for the product catalog.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Create a product. Fails with a conflict if the name is taken.
    async fn create(&self, product: &Product) -> Result<Product>;

    /// Get a product by ID.
    async fn get(&self, id: ProductId) -> Result<Option<Product>>;

    /// Get a product by its unique name.
    async fn get_by_name(&self, name: &str) -> Result<Option<Product>>;

    /// List all products ordered by name.
    async fn list(&self) -> Result<Vec<Product>>;

    /// Update name and description.
    async fn update(&self, product: &Product) -> Result<Product>;

    /// Delete a product together with all of its licenses.
    async fn delete(&self, id: ProductId) -> Result<()>;
}
