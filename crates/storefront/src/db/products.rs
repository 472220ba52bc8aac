//! Product repository for catalog reads and stock mutation.
//!
//! Stock decrements are conditional (`stock >= wanted`) so no interleaved
//! writer can ever drive stock negative; callers treat an unmatched update
//! as a stock conflict.

use chrono::{DateTime, Utc};
use sqlx::prelude::FromRow;
use sqlx::{SqliteConnection, SqlitePool};

use shoplane_core::{Price, ProductId};

use super::RepositoryError;
use crate::models::Product;

/// Fields required to insert a new catalog product.
#[derive(Debug)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub category: &'a str,
    pub price: Price,
    pub stock: u32,
    pub image_url: Option<&'a str>,
}

#[derive(FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    category: String,
    price: String,
    stock: i64,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
        let price = Price::parse(&self.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;
        let stock = u32::try_from(self.stock).map_err(|_| {
            RepositoryError::DataCorruption(format!("negative stock in database: {}", self.stock))
        })?;

        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            category: self.category,
            price,
            stock,
            image_url: self.image_url,
            created_at: self.created_at,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, name, category, price, stock, image_url, created_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List the whole catalog, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"))
                .fetch_all(self.pool)
                .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// List products in one category, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE category = ? ORDER BY id"
        ))
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Insert a new catalog product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewProduct<'_>) -> Result<Product, RepositoryError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO products (name, category, price, stock, image_url, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(new.name)
        .bind(new.category)
        .bind(new.price)
        .bind(i64::from(new.stock))
        .bind(new.image_url)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(Product {
            id: ProductId::new(result.last_insert_rowid()),
            name: new.name.to_owned(),
            category: new.category.to_owned(),
            price: new.price,
            stock: new.stock,
            image_url: new.image_url.map(ToOwned::to_owned),
            created_at: now,
        })
    }

    /// Get a product inside an open transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id_in_tx(
        conn: &mut SqliteConnection,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
                .bind(id)
                .fetch_optional(conn)
                .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Conditionally decrement stock inside an open transaction.
    ///
    /// Returns `false` when the product no longer has `quantity` units, in
    /// which case nothing was written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn decrement_stock(
        conn: &mut SqliteConnection,
        id: ProductId,
        quantity: u32,
    ) -> Result<bool, RepositoryError> {
        let wanted = i64::from(quantity);
        let result =
            sqlx::query("UPDATE products SET stock = stock - ? WHERE id = ? AND stock >= ?")
                .bind(wanted)
                .bind(id)
                .bind(wanted)
                .execute(conn)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
