//! Catalog product model.

use chrono::{DateTime, Utc};

use shoplane_core::{Price, ProductId};

/// A purchasable catalog product.
///
/// `stock` is the remaining purchasable quantity and is mutated only by
/// order placement; it never goes below zero.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Price,
    pub stock: u32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
