//! Product routes.
//!
//! Public catalog reads; no login required.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shoplane_core::ProductId;

use crate::error::Result;
use crate::models::Product;
use crate::services::CatalogService;
use crate::state::AppState;

/// Product as returned to clients. Price is a fixed two-decimal string.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: String,
    pub stock: u32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.into(),
            name: product.name,
            category: product.category,
            price: product.price.to_string(),
            stock: product.stock,
            image_url: product.image_url,
            created_at: product.created_at,
        }
    }
}

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

/// List products, optionally filtered by category.
///
/// GET /products?category=Electronics
///
/// # Errors
///
/// Returns 500 if the catalog read fails.
#[tracing::instrument(skip_all, fields(category = query.category.as_deref()))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProductView>>> {
    let catalog = CatalogService::new(state.pool());
    let products = catalog.products(query.category.as_deref()).await?;
    Ok(Json(products.into_iter().map(ProductView::from).collect()))
}

/// Get one product.
///
/// GET /products/{id}
///
/// # Errors
///
/// Returns 404 if the product doesn't exist.
#[tracing::instrument(skip_all, fields(product_id = id))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductView>> {
    let catalog = CatalogService::new(state.pool());
    let product = catalog.product(ProductId::new(id)).await?;
    Ok(Json(ProductView::from(product)))
}
