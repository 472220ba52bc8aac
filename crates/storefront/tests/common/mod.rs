//! Shared helpers for integration tests.
//!
//! Each test gets its own in-memory `SQLite` database. The pool is capped
//! at one connection because every in-memory connection is a separate
//! database.

#![allow(clippy::unwrap_used)]
#![allow(dead_code)]

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use shoplane_core::Price;
use shoplane_storefront::db::MIGRATOR;
use shoplane_storefront::db::products::{NewProduct, ProductRepository};
use shoplane_storefront::models::{Product, User};
use shoplane_storefront::services::AccountService;

/// Fresh migrated in-memory database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    MIGRATOR.run(&pool).await.unwrap();
    pool
}

/// Register a user through the real registration path.
pub async fn seed_user(pool: &SqlitePool, name: &str, email: &str, phone: &str) -> User {
    AccountService::new(pool)
        .register(name, email, phone, "pass1234")
        .await
        .unwrap()
}

/// Insert a catalog product.
pub async fn seed_product(
    pool: &SqlitePool,
    name: &str,
    category: &str,
    price: &str,
    stock: u32,
) -> Product {
    ProductRepository::new(pool)
        .create(&NewProduct {
            name,
            category,
            price: Price::parse(price).unwrap(),
            stock,
            image_url: None,
        })
        .await
        .unwrap()
}
