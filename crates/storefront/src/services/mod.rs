//! Business logic services.
//!
//! Services own validation and invariants; repositories own SQL. Every
//! operation takes the acting user's ID explicitly - there is no ambient
//! identity below the session layer.

pub mod account;
pub mod cart;
pub mod catalog;
mod error;
pub mod order;

pub use account::AccountService;
pub use cart::CartService;
pub use catalog::CatalogService;
pub use error::StoreError;
pub use order::OrderService;
