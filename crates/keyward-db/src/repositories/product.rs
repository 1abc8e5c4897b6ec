//! PostgreSQL implementation of ProductRepository.

use super::map_write_error;
use async_trait::async_trait;
use keyward_core::ids::ProductId;
use keyward_core::ports::ProductRepository;
use keyward_core::product::Product;
use keyward_core::{Error, Result};
use sqlx::{PgPool, Row};

/// PostgreSQL implementation of ProductRepository.
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    /// Create a new PgProductRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_product(r: &sqlx::postgres::PgRow) -> Product {
        Product {
            id: ProductId::from_uuid(r.get::<uuid::Uuid, _>("id")),
            name: r.get("name"),
            description: r.get("description"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, product: &Product) -> Result<Product> {
        sqlx::query(
            "INSERT INTO products (id, name, description, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(e, || {
                format!("Product with name '{}' already exists.", product.name)
            })
        })?;

        Ok(product.clone())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(
            "SELECT id, name, description, created_at, updated_at FROM products WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(row.as_ref().map(Self::row_to_product))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Product>> {
        let row = sqlx::query(
            "SELECT id, name, description, created_at, updated_at FROM products WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(row.as_ref().map(Self::row_to_product))
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT id, name, description, created_at, updated_at FROM products ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(rows.iter().map(Self::row_to_product).collect())
    }

    async fn update(&self, product: &Product) -> Result<Product> {
        let row = sqlx::query(
            "UPDATE products SET name = $2, description = $3, updated_at = NOW() WHERE id = $1 RETURNING id, name, description, created_at, updated_at",
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(e, || {
                format!("Product with name '{}' already exists.", product.name)
            })
        })?;

        row.as_ref()
            .map(Self::row_to_product)
            .ok_or_else(|| Error::NotFound(format!("Product not found with id: {}", product.id)))
    }

    async fn delete(&self, id: ProductId) -> Result<()> {
        // licenses.product_id cascades
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }
}
