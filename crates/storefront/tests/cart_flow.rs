//! Cart mutation flows: add/merge, quantity steps, ownership, clearing.

#![allow(clippy::unwrap_used)]

mod common;

use shoplane_core::{CartItemId, ProductId};
use shoplane_storefront::services::{CartService, StoreError};

use common::{seed_product, seed_user, test_pool};

#[tokio::test]
async fn add_merges_into_existing_line() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "25.00", 10).await;
    let carts = CartService::new(&pool);

    carts.add_to_cart(user.id, lamp.id, 2).await.unwrap();
    carts.add_to_cart(user.id, lamp.id, 3).await.unwrap();

    let lines = carts.items(user.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].item.quantity, 5);
}

#[tokio::test]
async fn add_rejects_merged_quantity_beyond_stock() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "25.00", 5).await;
    let carts = CartService::new(&pool);

    carts.add_to_cart(user.id, lamp.id, 3).await.unwrap();
    let err = carts.add_to_cart(user.id, lamp.id, 3).await.unwrap_err();

    assert!(matches!(err, StoreError::InsufficientStock { product } if product == "Desk Lamp"));

    // The failed add left the cart unchanged.
    let lines = carts.items(user.id).await.unwrap();
    assert_eq!(lines[0].item.quantity, 3);
}

#[tokio::test]
async fn add_rejects_merged_quantity_beyond_u32_range() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "25.00", 5).await;
    let carts = CartService::new(&pool);

    carts.add_to_cart(user.id, lamp.id, 3).await.unwrap();
    let err = carts
        .add_to_cart(user.id, lamp.id, u32::MAX - 1)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::InsufficientStock { product } if product == "Desk Lamp"));

    let lines = carts.items(user.id).await.unwrap();
    assert_eq!(lines[0].item.quantity, 3);
}

#[tokio::test]
async fn add_rejects_zero_quantity() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "25.00", 5).await;

    let err = CartService::new(&pool)
        .add_to_cart(user.id, lamp.id, 0)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Validation(msg) if msg == "Quantity must be >= 1"));
}

#[tokio::test]
async fn add_rejects_unknown_product() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;

    let err = CartService::new(&pool)
        .add_to_cart(user.id, ProductId::new(999), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound(msg) if msg == "Product not found"));
}

#[tokio::test]
async fn increase_and_decrease_step_by_one() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "25.00", 5).await;
    let carts = CartService::new(&pool);

    let item = carts.add_to_cart(user.id, lamp.id, 2).await.unwrap();

    carts.increase(user.id, item.id).await.unwrap();
    carts.decrease(user.id, item.id).await.unwrap();
    carts.decrease(user.id, item.id).await.unwrap();

    let lines = carts.items(user.id).await.unwrap();
    assert_eq!(lines[0].item.quantity, 1);
}

#[tokio::test]
async fn decrease_at_one_is_rejected() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "25.00", 5).await;
    let carts = CartService::new(&pool);

    let item = carts.add_to_cart(user.id, lamp.id, 1).await.unwrap();
    let err = carts.decrease(user.id, item.id).await.unwrap_err();

    assert!(matches!(err, StoreError::Validation(msg) if msg == "Quantity must be >= 1"));

    let lines = carts.items(user.id).await.unwrap();
    assert_eq!(lines[0].item.quantity, 1);
}

#[tokio::test]
async fn increase_at_stock_limit_is_rejected() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "25.00", 2).await;
    let carts = CartService::new(&pool);

    let item = carts.add_to_cart(user.id, lamp.id, 2).await.unwrap();
    let err = carts.increase(user.id, item.id).await.unwrap_err();

    assert!(matches!(err, StoreError::InsufficientStock { product } if product == "Desk Lamp"));
}

#[tokio::test]
async fn foreign_item_is_forbidden() {
    let pool = test_pool().await;
    let asha = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let ravi = seed_user(&pool, "Ravi Iyer", "ravi@example.com", "9123456780").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "25.00", 5).await;
    let carts = CartService::new(&pool);

    let item = carts.add_to_cart(asha.id, lamp.id, 1).await.unwrap();

    let err = carts.increase(ravi.id, item.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotOwned));

    let err = carts.remove(ravi.id, item.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotOwned));

    // Asha's cart is untouched.
    let lines = carts.items(asha.id).await.unwrap();
    assert_eq!(lines[0].item.quantity, 1);
}

#[tokio::test]
async fn unknown_item_is_not_found() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;

    let err = CartService::new(&pool)
        .remove(user.id, CartItemId::new(999))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound(msg) if msg == "Cart item not found"));
}

#[tokio::test]
async fn remove_and_clear_empty_the_cart() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "25.00", 5).await;
    let mug = seed_product(&pool, "Mug", "Kitchen", "5.00", 5).await;
    let carts = CartService::new(&pool);

    let item = carts.add_to_cart(user.id, lamp.id, 1).await.unwrap();
    carts.add_to_cart(user.id, mug.id, 2).await.unwrap();

    carts.remove(user.id, item.id).await.unwrap();
    let lines = carts.items(user.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product.id, mug.id);

    carts.clear(user.id).await.unwrap();
    assert!(carts.items(user.id).await.unwrap().is_empty());

    // Clearing an empty cart is a no-op.
    carts.clear(user.id).await.unwrap();
}

#[tokio::test]
async fn update_overwrites_quantity_within_stock() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "25.00", 5).await;
    let carts = CartService::new(&pool);

    let item = carts.add_to_cart(user.id, lamp.id, 1).await.unwrap();
    carts.update(user.id, item.id, 4).await.unwrap();

    let lines = carts.items(user.id).await.unwrap();
    assert_eq!(lines[0].item.quantity, 4);

    let err = carts.update(user.id, item.id, 6).await.unwrap_err();
    assert!(matches!(err, StoreError::InsufficientStock { .. }));
}
