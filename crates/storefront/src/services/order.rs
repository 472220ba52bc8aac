//! Order engine.
//!
//! Order placement is the only writer of product stock. The whole
//! placement runs in one transaction: stock decrements, order rows, and
//! the cart clear commit together or not at all. Unit prices are captured
//! at placement time, so later catalog edits never rewrite history.

use chrono::Utc;
use sqlx::SqlitePool;

use shoplane_core::{PaymentMode, Price, ProductId, UserId};

use crate::db::carts::CartRepository;
use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::models::OrderWithItems;

use super::StoreError;

/// What an order is placed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSource {
    /// Everything currently in the user's cart; the cart is emptied on
    /// success.
    Cart,
    /// A single unit of one product, bypassing the cart entirely.
    Direct(ProductId),
}

struct PendingItem {
    product_id: ProductId,
    quantity: u32,
    unit_price: Price,
}

/// Order engine.
///
/// Owns the placement transaction; holds the pool directly rather than a
/// repository so it can begin one.
pub struct OrderService<'a> {
    pool: &'a SqlitePool,
    users: UserRepository<'a>,
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            users: UserRepository::new(pool),
            orders: OrderRepository::new(pool),
        }
    }

    /// Place an order from the cart or directly for one product.
    ///
    /// On success every line's stock has been decremented, the order and
    /// its items are durable, and for [`OrderSource::Cart`] the cart is
    /// empty. On any error nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for a blank address, an
    /// unrecognized payment mode, or an empty cart.
    /// Returns `StoreError::NotFound` if the user or product doesn't exist.
    /// Returns `StoreError::OutOfStock` for a direct order of a product
    /// with zero stock.
    /// Returns `StoreError::InsufficientStock` naming the first cart line
    /// that wants more units than remain.
    pub async fn place_order(
        &self,
        user_id: UserId,
        source: OrderSource,
        shipping_address: &str,
        payment_mode: &str,
    ) -> Result<OrderWithItems, StoreError> {
        let shipping_address = shipping_address.trim();
        if shipping_address.is_empty() {
            return Err(StoreError::Validation("Address is required".to_owned()));
        }

        let payment_mode = PaymentMode::parse(payment_mode).map_err(|_| {
            StoreError::Validation("Please select a valid payment mode".to_owned())
        })?;

        if self.users.get_by_id(user_id).await?.is_none() {
            return Err(StoreError::NotFound("User not found".to_owned()));
        }

        let mut tx = self.pool.begin().await.map_err(crate::db::RepositoryError::from)?;

        let items = match source {
            OrderSource::Direct(product_id) => {
                let product = ProductRepository::get_by_id_in_tx(&mut tx, product_id)
                    .await?
                    .ok_or_else(|| StoreError::NotFound("Product not found".to_owned()))?;

                if product.stock < 1 {
                    return Err(StoreError::OutOfStock);
                }

                vec![PendingItem {
                    product_id: product.id,
                    quantity: 1,
                    unit_price: product.price,
                }]
            }
            OrderSource::Cart => {
                let cart = CartRepository::get_by_user_in_tx(&mut tx, user_id)
                    .await?
                    .ok_or_else(|| StoreError::Validation("Cart is empty".to_owned()))?;
                let lines = CartRepository::lines_in_tx(&mut tx, cart.id).await?;
                if lines.is_empty() {
                    return Err(StoreError::Validation("Cart is empty".to_owned()));
                }

                // Validate every line before touching stock so the error
                // names the offending product without partial decrements.
                for line in &lines {
                    if line.item.quantity > line.product.stock {
                        return Err(StoreError::InsufficientStock {
                            product: line.product.name.clone(),
                        });
                    }
                }

                lines
                    .into_iter()
                    .map(|line| PendingItem {
                        product_id: line.product.id,
                        quantity: line.item.quantity,
                        unit_price: line.product.price,
                    })
                    .collect()
            }
        };

        let mut total = Price::ZERO;
        for item in &items {
            // The conditional decrement is the authoritative stock check;
            // a concurrent order may have won since the read above.
            let decremented =
                ProductRepository::decrement_stock(&mut tx, item.product_id, item.quantity)
                    .await?;
            if !decremented {
                return Err(self.stock_failure(&mut tx, source, item.product_id).await?);
            }
            total = total + item.unit_price.times(item.quantity);
        }

        let created_at = Utc::now();
        let order_id = OrderRepository::insert_order(
            &mut tx,
            user_id,
            total,
            shipping_address,
            payment_mode,
            created_at,
        )
        .await?;

        for item in &items {
            OrderRepository::insert_order_item(
                &mut tx,
                order_id,
                item.product_id,
                item.quantity,
                item.unit_price,
            )
            .await?;
        }

        if source == OrderSource::Cart
            && let Some(cart) = CartRepository::get_by_user_in_tx(&mut tx, user_id).await?
        {
            CartRepository::clear_in_tx(&mut tx, cart.id).await?;
        }

        tx.commit().await.map_err(crate::db::RepositoryError::from)?;

        let placed = self.orders.get_with_items(order_id).await?;
        tracing::info!(
            user_id = %user_id,
            order_id = %order_id,
            total = %placed.order.total_amount,
            items = placed.lines.len(),
            "order placed"
        );
        Ok(placed)
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    pub async fn history(&self, user_id: UserId) -> Result<Vec<OrderWithItems>, StoreError> {
        if self.users.get_by_id(user_id).await?.is_none() {
            return Err(StoreError::NotFound("User not found".to_owned()));
        }
        Ok(self.orders.history(user_id).await?)
    }

    /// Shape a failed conditional decrement into the caller-facing error.
    async fn stock_failure(
        &self,
        tx: &mut sqlx::SqliteConnection,
        source: OrderSource,
        product_id: ProductId,
    ) -> Result<StoreError, StoreError> {
        if matches!(source, OrderSource::Direct(_)) {
            return Ok(StoreError::OutOfStock);
        }
        let name = ProductRepository::get_by_id_in_tx(tx, product_id)
            .await?
            .map_or_else(|| "product".to_owned(), |p| p.name);
        Ok(StoreError::InsufficientStock { product: name })
    }
}
