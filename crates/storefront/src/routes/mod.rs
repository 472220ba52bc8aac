//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness check
//! GET    /health/ready              - Readiness check (pings the database)
//!
//! # Auth
//! POST   /auth/register             - Create an account (logs the user in)
//! POST   /auth/login                - Login by email or phone
//! POST   /auth/logout               - Logout
//!
//! # Products
//! GET    /products                  - Product listing (?category= filter)
//! GET    /products/{id}             - Product detail
//!
//! # Account (requires auth)
//! GET    /account/profile           - Current user's profile
//! PUT    /account/profile           - Update profile
//!
//! # Cart (requires auth)
//! GET    /cart                      - Cart contents with totals
//! POST   /cart/items                - Add a product to the cart
//! PUT    /cart/items/{id}           - Overwrite an item's quantity
//! POST   /cart/items/{id}/increase  - Bump quantity by one
//! POST   /cart/items/{id}/decrease  - Drop quantity by one
//! DELETE /cart/items/{id}           - Remove an item
//! DELETE /cart                      - Empty the cart
//!
//! # Checkout and orders (requires auth)
//! GET    /checkout                  - Checkout summary (?product_id= for
//!                                     a direct single-product purchase)
//! POST   /orders                    - Place an order (cart or direct)
//! GET    /orders                    - Order history, newest first
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route(
            "/items/{id}",
            put(cart::update).delete(cart::remove),
        )
        .route("/items/{id}/increase", post(cart::increase))
        .route("/items/{id}/decrease", post(cart::decrease))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new().route("/profile", get(account::show).put(account::update))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new().route("/", post(orders::place).get(orders::history))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/account", account_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", get(orders::checkout))
        .nest("/orders", order_routes())
}
