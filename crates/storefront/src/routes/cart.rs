//! Cart routes.
//!
//! All endpoints operate on the logged-in user's own cart; item IDs in the
//! path are re-checked for ownership by the service.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use shoplane_core::{CartItemId, Price, ProductId};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::CartLine;
use crate::services::CartService;
use crate::state::AppState;

use super::products::ProductView;

/// One cart line as returned to clients.
#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub item_id: i64,
    pub quantity: u32,
    pub subtotal: String,
    pub product: ProductView,
}

impl From<CartLine> for CartLineView {
    fn from(line: CartLine) -> Self {
        Self {
            item_id: line.item.id.into(),
            quantity: line.item.quantity,
            subtotal: line.product.price.times(line.item.quantity).to_string(),
            product: ProductView::from(line.product),
        }
    }
}

/// Cart contents with the running total.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total: String,
}

impl CartView {
    pub(crate) fn from_lines(lines: Vec<CartLine>) -> Self {
        let total = lines
            .iter()
            .fold(Price::ZERO, |acc, line| {
                acc + line.product.price.times(line.item.quantity)
            })
            .to_string();

        Self {
            items: lines.into_iter().map(CartLineView::from).collect(),
            total,
        }
    }
}

/// Request to add a product to the cart.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: i64,
    pub quantity: u32,
}

/// Request to overwrite an item's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

/// Show the cart.
///
/// GET /cart
///
/// # Errors
///
/// Returns 401 when not logged in.
#[tracing::instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<CartView>> {
    let carts = CartService::new(state.pool());
    let lines = carts.items(current.id).await?;
    Ok(Json(CartView::from_lines(lines)))
}

/// Add a product to the cart.
///
/// POST /cart/items
///
/// # Errors
///
/// Returns 400 for a zero quantity, 404 for an unknown product, 409 when
/// the merged quantity would exceed stock.
#[tracing::instrument(skip_all, fields(product_id = req.product_id, quantity = req.quantity))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartView>)> {
    let carts = CartService::new(state.pool());
    carts
        .add_to_cart(current.id, ProductId::new(req.product_id), req.quantity)
        .await?;

    let lines = carts.items(current.id).await?;
    Ok((StatusCode::CREATED, Json(CartView::from_lines(lines))))
}

/// Overwrite an item's quantity.
///
/// PUT /cart/items/{id}
///
/// # Errors
///
/// Returns 400 for a zero quantity, 403 for someone else's item, 404 for an
/// unknown item, 409 when the quantity exceeds stock.
#[tracing::instrument(skip_all, fields(item_id = id, quantity = req.quantity))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i64>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let carts = CartService::new(state.pool());
    carts
        .update(current.id, CartItemId::new(id), req.quantity)
        .await?;

    let lines = carts.items(current.id).await?;
    Ok(Json(CartView::from_lines(lines)))
}

/// Bump an item's quantity by one.
///
/// POST /cart/items/{id}/increase
///
/// # Errors
///
/// Returns 403/404 per ownership, 409 when stock is exhausted.
#[tracing::instrument(skip_all, fields(item_id = id))]
pub async fn increase(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Json<CartView>> {
    let carts = CartService::new(state.pool());
    carts.increase(current.id, CartItemId::new(id)).await?;

    let lines = carts.items(current.id).await?;
    Ok(Json(CartView::from_lines(lines)))
}

/// Drop an item's quantity by one.
///
/// POST /cart/items/{id}/decrease
///
/// # Errors
///
/// Returns 400 at quantity one, 403/404 per ownership.
#[tracing::instrument(skip_all, fields(item_id = id))]
pub async fn decrease(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Json<CartView>> {
    let carts = CartService::new(state.pool());
    carts.decrease(current.id, CartItemId::new(id)).await?;

    let lines = carts.items(current.id).await?;
    Ok(Json(CartView::from_lines(lines)))
}

/// Remove an item from the cart.
///
/// DELETE /cart/items/{id}
///
/// # Errors
///
/// Returns 403/404 per ownership.
#[tracing::instrument(skip_all, fields(item_id = id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Json<CartView>> {
    let carts = CartService::new(state.pool());
    carts.remove(current.id, CartItemId::new(id)).await?;

    let lines = carts.items(current.id).await?;
    Ok(Json(CartView::from_lines(lines)))
}

/// Empty the cart.
///
/// DELETE /cart
///
/// Idempotent.
///
/// # Errors
///
/// Returns 401 when not logged in.
#[tracing::instrument(skip_all)]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<CartView>> {
    let carts = CartService::new(state.pool());
    carts.clear(current.id).await?;
    Ok(Json(CartView::from_lines(Vec::new())))
}
