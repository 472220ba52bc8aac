//! Checkout and order routes.
//!
//! Checkout is a read-only summary; placement happens in one POST, either
//! from the whole cart or directly for a single product.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shoplane_core::{PaymentMode, Price, ProductId};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{OrderLine, OrderWithItems};
use crate::services::{
    AccountService, CartService, CatalogService, OrderService, order::OrderSource,
};
use crate::state::AppState;

use super::products::ProductView;

/// Checkout summary: what would be bought, the payment modes, and the
/// saved address.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub items: Vec<CheckoutLineView>,
    pub total: String,
    pub payment_modes: Vec<String>,
    pub saved_address: Option<String>,
}

/// One line of the checkout summary.
#[derive(Debug, Serialize)]
pub struct CheckoutLineView {
    pub quantity: u32,
    pub subtotal: String,
    pub product: ProductView,
}

/// One line of a placed order.
#[derive(Debug, Serialize)]
pub struct OrderLineView {
    pub quantity: u32,
    pub unit_price: String,
    pub subtotal: String,
    pub product: ProductView,
}

impl From<OrderLine> for OrderLineView {
    fn from(line: OrderLine) -> Self {
        Self {
            quantity: line.item.quantity,
            unit_price: line.item.unit_price.to_string(),
            subtotal: line.item.unit_price.times(line.item.quantity).to_string(),
            product: ProductView::from(line.product),
        }
    }
}

/// A placed order as returned to clients.
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: i64,
    pub total_amount: String,
    pub shipping_address: String,
    pub payment_mode: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderLineView>,
}

impl From<OrderWithItems> for OrderView {
    fn from(placed: OrderWithItems) -> Self {
        Self {
            id: placed.order.id.into(),
            total_amount: placed.order.total_amount.to_string(),
            shipping_address: placed.order.shipping_address,
            payment_mode: placed.order.payment_mode.as_str().to_owned(),
            created_at: placed.order.created_at,
            items: placed.lines.into_iter().map(OrderLineView::from).collect(),
        }
    }
}

/// Request to place an order.
///
/// With `product_id` set the order is for one unit of that product and the
/// cart is untouched; without it the whole cart is ordered and emptied.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub shipping_address: String,
    pub payment_mode: String,
    #[serde(default)]
    pub product_id: Option<i64>,
}

/// Query parameters for the checkout summary.
#[derive(Debug, Deserialize)]
pub struct CheckoutQuery {
    /// Summarize a direct single-product purchase instead of the cart.
    pub product_id: Option<i64>,
}

/// Checkout summary for the logged-in user.
///
/// GET /checkout
///
/// Without `product_id` the summary covers the cart; with it, one unit of
/// that product, mirroring what a subsequent direct order would buy.
///
/// # Errors
///
/// Returns 401 when not logged in, 404 for an unknown `product_id`.
#[tracing::instrument(skip_all, fields(direct = query.product_id.is_some()))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Query(query): Query<CheckoutQuery>,
) -> Result<Json<CheckoutView>> {
    let accounts = AccountService::new(state.pool());
    let user = accounts.find_by_id(current.id).await?;

    let (items, total) = match query.product_id {
        Some(id) => {
            let product = CatalogService::new(state.pool())
                .product(ProductId::new(id))
                .await?;
            let total = product.price;
            let line = CheckoutLineView {
                quantity: 1,
                subtotal: total.to_string(),
                product: ProductView::from(product),
            };
            (vec![line], total)
        }
        None => {
            let lines = CartService::new(state.pool()).items(current.id).await?;
            let total = lines.iter().fold(Price::ZERO, |acc, line| {
                acc + line.product.price.times(line.item.quantity)
            });
            let items = lines
                .into_iter()
                .map(|line| CheckoutLineView {
                    quantity: line.item.quantity,
                    subtotal: line.product.price.times(line.item.quantity).to_string(),
                    product: ProductView::from(line.product),
                })
                .collect();
            (items, total)
        }
    };

    Ok(Json(CheckoutView {
        items,
        total: total.to_string(),
        payment_modes: PaymentMode::ALL
            .iter()
            .map(|mode| mode.as_str().to_owned())
            .collect(),
        saved_address: user.address,
    }))
}

/// Place an order.
///
/// POST /orders
///
/// # Errors
///
/// Returns 400 for a blank address, a bad payment mode, or an empty cart;
/// 404 for an unknown product; 409 when stock cannot cover the order.
#[tracing::instrument(skip_all, fields(direct = req.product_id.is_some()))]
pub async fn place(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderView>)> {
    let orders = OrderService::new(state.pool());

    let source = req
        .product_id
        .map_or(OrderSource::Cart, |id| OrderSource::Direct(ProductId::new(id)));

    let placed = orders
        .place_order(current.id, source, &req.shipping_address, &req.payment_mode)
        .await?;

    Ok((StatusCode::CREATED, Json(OrderView::from(placed))))
}

/// Order history for the logged-in user, newest first.
///
/// GET /orders
///
/// # Errors
///
/// Returns 401 when not logged in.
#[tracing::instrument(skip_all)]
pub async fn history(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<OrderView>>> {
    let orders = OrderService::new(state.pool());
    let placed = orders.history(current.id).await?;
    Ok(Json(placed.into_iter().map(OrderView::from).collect()))
}
