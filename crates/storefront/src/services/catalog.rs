//! Catalog service.
//!
//! Read-only product browsing. Stock is mutated only by the order engine.

use sqlx::SqlitePool;

use shoplane_core::ProductId;

use crate::db::products::ProductRepository;
use crate::models::Product;

use super::StoreError;

/// Catalog service for product listing and lookup.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    /// List products, optionally filtered by category.
    ///
    /// `None`, a blank string, or `"All"` (any casing) mean the whole
    /// catalog.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if the store fails.
    pub async fn products(&self, category: Option<&str>) -> Result<Vec<Product>, StoreError> {
        let filter = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("All"));

        let products = match filter {
            Some(category) => self.products.list_by_category(category).await?,
            None => self.products.list_all().await?,
        };

        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the product doesn't exist.
    pub async fn product(&self, id: ProductId) -> Result<Product, StoreError> {
        self.products
            .get_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound("Product not found".to_owned()))
    }
}
