//! Service-level error taxonomy.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors surfaced by cart, order, catalog, and account operations.
///
/// All variants are recoverable and carry a human-readable message; the
/// caller decides whether and how to retry.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    /// A referenced user, product, or cart item does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The cart item exists but belongs to a different user.
    #[error("Item does not belong to user")]
    NotOwned,

    /// A cart line (or cart mutation) wants more units than are in stock.
    #[error("Insufficient stock for {product}")]
    InsufficientStock {
        /// Name of the product that ran out.
        product: String,
    },

    /// Direct-mode purchase of a product with zero stock.
    #[error("Out of stock")]
    OutOfStock,

    /// Email or phone is already registered.
    #[error("{0}")]
    Duplicate(String),

    /// Password hashing failed.
    #[error("failed to hash password")]
    PasswordHash,

    /// The underlying store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
