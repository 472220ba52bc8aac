//! Order placement flows: totals, stock decrements, atomicity, history.

#![allow(clippy::unwrap_used)]

mod common;

use shoplane_core::{PaymentMode, Price, ProductId};
use shoplane_storefront::services::{
    CartService, CatalogService, OrderService, StoreError, order::OrderSource,
};

use common::{seed_product, seed_user, test_pool};

const ADDRESS: &str = "12 Hill Road, Pune";

#[tokio::test]
async fn cart_order_captures_total_and_clears_cart() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "10.00", 5).await;
    let mug = seed_product(&pool, "Mug", "Kitchen", "5.00", 5).await;
    let carts = CartService::new(&pool);

    carts.add_to_cart(user.id, lamp.id, 2).await.unwrap();
    carts.add_to_cart(user.id, mug.id, 1).await.unwrap();

    let placed = OrderService::new(&pool)
        .place_order(user.id, OrderSource::Cart, ADDRESS, "Upi")
        .await
        .unwrap();

    assert_eq!(placed.order.total_amount, Price::parse("25.00").unwrap());
    assert_eq!(placed.order.payment_mode, PaymentMode::Upi);
    assert_eq!(placed.order.shipping_address, ADDRESS);
    assert_eq!(placed.lines.len(), 2);

    // Stock decremented per line.
    let catalog = CatalogService::new(&pool);
    assert_eq!(catalog.product(lamp.id).await.unwrap().stock, 3);
    assert_eq!(catalog.product(mug.id).await.unwrap().stock, 4);

    // Cart emptied on success.
    assert!(carts.items(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn unit_price_is_captured_at_placement_time() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "10.00", 5).await;
    let carts = CartService::new(&pool);
    let orders = OrderService::new(&pool);

    carts.add_to_cart(user.id, lamp.id, 1).await.unwrap();
    let placed = orders
        .place_order(user.id, OrderSource::Cart, ADDRESS, "Upi")
        .await
        .unwrap();

    // A later price change never rewrites the placed order.
    sqlx::query("UPDATE products SET price = '99.00' WHERE id = ?")
        .bind(lamp.id)
        .execute(&pool)
        .await
        .unwrap();

    let history = orders.history(user.id).await.unwrap();
    assert_eq!(history[0].order.id, placed.order.id);
    assert_eq!(
        history[0].lines[0].item.unit_price,
        Price::parse("10.00").unwrap()
    );
    assert_eq!(
        history[0].order.total_amount,
        Price::parse("10.00").unwrap()
    );
}

#[tokio::test]
async fn empty_cart_order_is_rejected() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;

    let err = OrderService::new(&pool)
        .place_order(user.id, OrderSource::Cart, ADDRESS, "Upi")
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Validation(msg) if msg == "Cart is empty"));
}

#[tokio::test]
async fn blank_address_and_bad_payment_mode_are_rejected() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "10.00", 5).await;
    let carts = CartService::new(&pool);
    let orders = OrderService::new(&pool);

    carts.add_to_cart(user.id, lamp.id, 1).await.unwrap();

    let err = orders
        .place_order(user.id, OrderSource::Cart, "   ", "Upi")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(msg) if msg == "Address is required"));

    let err = orders
        .place_order(user.id, OrderSource::Cart, ADDRESS, "Barter")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(msg) if msg == "Please select a valid payment mode"));

    // Both rejections left cart and stock untouched.
    assert_eq!(carts.items(user.id).await.unwrap()[0].item.quantity, 1);
    assert_eq!(
        CatalogService::new(&pool).product(lamp.id).await.unwrap().stock,
        5
    );
}

#[tokio::test]
async fn stale_cart_line_fails_whole_order_atomically() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "10.00", 5).await;
    let mug = seed_product(&pool, "Mug", "Kitchen", "5.00", 5).await;
    let carts = CartService::new(&pool);

    carts.add_to_cart(user.id, lamp.id, 2).await.unwrap();
    carts.add_to_cart(user.id, mug.id, 3).await.unwrap();

    // Stock shrinks under the cart after the lines were added.
    sqlx::query("UPDATE products SET stock = 1 WHERE id = ?")
        .bind(mug.id)
        .execute(&pool)
        .await
        .unwrap();

    let err = OrderService::new(&pool)
        .place_order(user.id, OrderSource::Cart, ADDRESS, "Upi")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InsufficientStock { product } if product == "Mug"));

    // Nothing committed: stock and cart as before, no order recorded.
    let catalog = CatalogService::new(&pool);
    assert_eq!(catalog.product(lamp.id).await.unwrap().stock, 5);
    assert_eq!(catalog.product(mug.id).await.unwrap().stock, 1);
    assert_eq!(carts.items(user.id).await.unwrap().len(), 2);
    assert!(OrderService::new(&pool).history(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn direct_order_takes_one_unit_and_leaves_cart() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "10.00", 5).await;
    let mug = seed_product(&pool, "Mug", "Kitchen", "5.00", 5).await;
    let carts = CartService::new(&pool);

    carts.add_to_cart(user.id, mug.id, 2).await.unwrap();

    let placed = OrderService::new(&pool)
        .place_order(
            user.id,
            OrderSource::Direct(lamp.id),
            ADDRESS,
            "Cash on Delivery",
        )
        .await
        .unwrap();

    assert_eq!(placed.order.total_amount, Price::parse("10.00").unwrap());
    assert_eq!(placed.lines.len(), 1);
    assert_eq!(placed.lines[0].item.quantity, 1);

    // Direct mode never touches the cart.
    assert_eq!(carts.items(user.id).await.unwrap()[0].item.quantity, 2);
    assert_eq!(
        CatalogService::new(&pool).product(lamp.id).await.unwrap().stock,
        4
    );
}

#[tokio::test]
async fn direct_order_of_exhausted_product_is_rejected() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "10.00", 0).await;

    let err = OrderService::new(&pool)
        .place_order(user.id, OrderSource::Direct(lamp.id), ADDRESS, "Upi")
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::OutOfStock));
}

#[tokio::test]
async fn direct_order_of_unknown_product_is_not_found() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;

    let err = OrderService::new(&pool)
        .place_order(user.id, OrderSource::Direct(ProductId::new(999)), ADDRESS, "Upi")
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound(msg) if msg == "Product not found"));
}

#[tokio::test]
async fn history_is_newest_first_with_lines() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "10.00", 5).await;
    let orders = OrderService::new(&pool);

    let first = orders
        .place_order(user.id, OrderSource::Direct(lamp.id), ADDRESS, "Upi")
        .await
        .unwrap();
    let second = orders
        .place_order(user.id, OrderSource::Direct(lamp.id), ADDRESS, "Debit Card")
        .await
        .unwrap();

    let history = orders.history(user.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].order.id, second.order.id);
    assert_eq!(history[1].order.id, first.order.id);
    assert_eq!(history[0].lines.len(), 1);
}

#[tokio::test]
async fn history_is_scoped_to_the_user() {
    let pool = test_pool().await;
    let asha = seed_user(&pool, "Asha Rao", "asha@example.com", "9876543210").await;
    let ravi = seed_user(&pool, "Ravi Iyer", "ravi@example.com", "9123456780").await;
    let lamp = seed_product(&pool, "Desk Lamp", "Home", "10.00", 5).await;
    let orders = OrderService::new(&pool);

    orders
        .place_order(asha.id, OrderSource::Direct(lamp.id), ADDRESS, "Upi")
        .await
        .unwrap();

    assert!(orders.history(ravi.id).await.unwrap().is_empty());
}
