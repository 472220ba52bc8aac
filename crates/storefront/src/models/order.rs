//! Order models.
//!
//! Orders and their items are immutable once created. Item rows capture
//! the unit price at order time so later catalog price changes do not
//! rewrite order history.

use chrono::{DateTime, Utc};

use shoplane_core::{OrderId, OrderItemId, PaymentMode, Price, ProductId, UserId};

use super::Product;

/// A completed purchase.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Price,
    pub shipping_address: String,
    pub payment_mode: PaymentMode,
    pub created_at: DateTime<Utc>,
}

/// One product line of an order.
#[derive(Debug, Clone, Copy)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price at the time the order was placed.
    pub unit_price: Price,
}

/// An order item with its referenced product resolved.
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub item: OrderItem,
    pub product: Product,
}

/// An order with its lines eagerly resolved, as returned by order
/// placement and order history.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}
