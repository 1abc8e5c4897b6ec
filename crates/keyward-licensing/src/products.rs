//! Product catalog.

use keyward_core::ports::ProductRepository;
use keyward_core::product::Product;
use keyward_core::{Error, ProductId, Result};
use keyward_trace::product_span;
use std::sync::Arc;
use tracing::{Instrument, debug, info};

use crate::types::{ProductRequest, ProductResponse};

#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn create(&self, request: &ProductRequest) -> Result<ProductResponse> {
        let name = request.name.trim();
        async {
            if self.products.get_by_name(name).await?.is_some() {
                return Err(Error::Conflict(format!(
                    "Product with name '{}' already exists.",
                    name
                )));
            }

            let product = self
                .products
                .create(&Product::new(name, request.description.trim()))
                .await?;
            info!(product_id = %product.id, product = %product.name, "Product created");
            Ok(product.into())
        }
        .instrument(product_span("create", name))
        .await
    }

    pub async fn get(&self, id: ProductId) -> Result<ProductResponse> {
        self.find(id).await.map(Into::into)
    }

    pub async fn list(&self) -> Result<Vec<ProductResponse>> {
        let products = self.products.list().await?;
        debug!(count = products.len(), "Listed products");
        Ok(products.into_iter().map(Into::into).collect())
    }

    /// Rename or re-describe a product. Licenses follow by id.
    pub async fn update(&self, id: ProductId, request: &ProductRequest) -> Result<ProductResponse> {
        let name = request.name.trim();
        async {
            let mut product = self.find(id).await?;

            if let Some(owner) = self.products.get_by_name(name).await?
                && owner.id != id
            {
                return Err(Error::Conflict(format!(
                    "Product with name '{}' already exists.",
                    name
                )));
            }

            product.name = name.to_string();
            product.description = request.description.trim().to_string();
            let product = self.products.update(&product).await?;
            info!(product_id = %product.id, product = %product.name, "Product updated");
            Ok(product.into())
        }
        .instrument(product_span("update", name))
        .await
    }

    /// Delete a product together with its licenses.
    pub async fn delete(&self, id: ProductId) -> Result<()> {
        let product = self.find(id).await?;
        async {
            self.products.delete(id).await?;
            info!(product_id = %id, product = %product.name, "Product deleted");
            Ok(())
        }
        .instrument(product_span("delete", &product.name))
        .await
    }

    /// Resolve a product by its unique name.
    pub async fn get_by_name(&self, name: &str) -> Result<Product> {
        self.products
            .get_by_name(name)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Product not found with name: {}", name)))
    }

    async fn find(&self, id: ProductId) -> Result<Product> {
        self.products
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Product not found with id: {}", id)))
    }
}
