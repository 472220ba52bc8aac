//! Order repository.
//!
//! Order and order item inserts only run inside the order placement
//! transaction, so they take the open connection rather than the pool.
//! History reads resolve items and products eagerly, newest order first.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::prelude::FromRow;
use sqlx::{SqliteConnection, SqlitePool};

use shoplane_core::{OrderId, OrderItemId, PaymentMode, Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, OrderLine, OrderWithItems, Product};

#[derive(FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    total_amount: String,
    shipping_address: String,
    payment_mode: String,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let total_amount = Price::parse(&self.total_amount).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order total in database: {e}"))
        })?;
        let payment_mode = PaymentMode::parse(&self.payment_mode).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment mode in database: {e}"))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            total_amount,
            shipping_address: self.shipping_address,
            payment_mode,
            created_at: self.created_at,
        })
    }
}

/// Joined order item + product row for history reads.
#[derive(FromRow)]
struct OrderLineRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    quantity: i64,
    unit_price: String,
    product_name: String,
    product_category: String,
    product_price: String,
    product_stock: i64,
    product_image_url: Option<String>,
    product_created_at: DateTime<Utc>,
}

impl OrderLineRow {
    fn into_line(self) -> Result<(OrderId, OrderLine), RepositoryError> {
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "invalid order quantity in database: {}",
                self.quantity
            ))
        })?;
        let unit_price = Price::parse(&self.unit_price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid unit price in database: {e}"))
        })?;
        let product_price = Price::parse(&self.product_price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;
        let product_stock = u32::try_from(self.product_stock).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative stock in database: {}",
                self.product_stock
            ))
        })?;

        let order_id = OrderId::new(self.order_id);
        let line = OrderLine {
            item: OrderItem {
                id: OrderItemId::new(self.id),
                order_id,
                product_id: ProductId::new(self.product_id),
                quantity,
                unit_price,
            },
            product: Product {
                id: ProductId::new(self.product_id),
                name: self.product_name,
                category: self.product_category,
                price: product_price,
                stock: product_stock,
                image_url: self.product_image_url,
                created_at: self.product_created_at,
            },
        };

        Ok((order_id, line))
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the order row inside an open transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_order(
        conn: &mut SqliteConnection,
        user_id: UserId,
        total_amount: Price,
        shipping_address: &str,
        payment_mode: PaymentMode,
        created_at: DateTime<Utc>,
    ) -> Result<OrderId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO orders (user_id, total_amount, shipping_address, payment_mode, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(total_amount)
        .bind(shipping_address)
        .bind(payment_mode)
        .bind(created_at)
        .execute(conn)
        .await?;

        Ok(OrderId::new(result.last_insert_rowid()))
    }

    /// Insert one order item inside an open transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_order_item(
        conn: &mut SqliteConnection,
        order_id: OrderId,
        product_id: ProductId,
        quantity: u32,
        unit_price: Price,
    ) -> Result<OrderItemId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, unit_price) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(i64::from(quantity))
        .bind(unit_price)
        .execute(conn)
        .await?;

        Ok(OrderItemId::new(result.last_insert_rowid()))
    }

    /// All of a user's orders, newest first, with items and products resolved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn history(&self, user_id: UserId) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let order_rows: Vec<OrderRow> = sqlx::query_as(
            "SELECT id, user_id, total_amount, shipping_address, payment_mode, created_at \
             FROM orders WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let line_rows: Vec<OrderLineRow> = sqlx::query_as(
            "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity, oi.unit_price, \
             p.name AS product_name, p.category AS product_category, \
             p.price AS product_price, p.stock AS product_stock, \
             p.image_url AS product_image_url, p.created_at AS product_created_at \
             FROM order_items oi \
             JOIN orders o ON o.id = oi.order_id \
             JOIN products p ON p.id = oi.product_id \
             WHERE o.user_id = ? ORDER BY oi.id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let mut lines_by_order: HashMap<OrderId, Vec<OrderLine>> = HashMap::new();
        for row in line_rows {
            let (order_id, line) = row.into_line()?;
            lines_by_order.entry(order_id).or_default().push(line);
        }

        let mut orders = Vec::with_capacity(order_rows.len());
        for row in order_rows {
            let order = row.into_order()?;
            let lines = lines_by_order.remove(&order.id).unwrap_or_default();
            orders.push(OrderWithItems { order, lines });
        }

        Ok(orders)
    }

    /// Load one order with its lines, as returned right after placement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn get_with_items(&self, id: OrderId) -> Result<OrderWithItems, RepositoryError> {
        let order_row: Option<OrderRow> = sqlx::query_as(
            "SELECT id, user_id, total_amount, shipping_address, payment_mode, created_at \
             FROM orders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let order = order_row.ok_or(RepositoryError::NotFound)?.into_order()?;

        let line_rows: Vec<OrderLineRow> = sqlx::query_as(
            "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity, oi.unit_price, \
             p.name AS product_name, p.category AS product_category, \
             p.price AS product_price, p.stock AS product_stock, \
             p.image_url AS product_image_url, p.created_at AS product_created_at \
             FROM order_items oi \
             JOIN products p ON p.id = oi.product_id \
             WHERE oi.order_id = ? ORDER BY oi.id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let mut lines = Vec::with_capacity(line_rows.len());
        for row in line_rows {
            let (_, line) = row.into_line()?;
            lines.push(line);
        }

        Ok(OrderWithItems { order, lines })
    }
}
