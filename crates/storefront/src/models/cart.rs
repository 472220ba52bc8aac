//! Cart and cart item models.

use shoplane_core::{CartId, CartItemId, ProductId, UserId};

use super::Product;

/// A user's cart. Each user owns exactly one, provisioned at registration
/// and re-created lazily if missing.
#[derive(Debug, Clone, Copy)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
}

/// A single product line in a cart. At most one exists per
/// (cart, product) pair.
#[derive(Debug, Clone, Copy)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A cart item together with its resolved product, as read for display
/// and for order placement.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Product,
}
