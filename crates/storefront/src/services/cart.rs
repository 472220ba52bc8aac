//! Cart service.
//!
//! Mutations re-verify ownership on every call and are all-or-nothing:
//! a failed check writes nothing. Stock checks here are advisory - they
//! compare against the catalog snapshot read within the same operation
//! and reserve nothing; order placement re-checks authoritatively.

use sqlx::SqlitePool;

use shoplane_core::{CartItemId, ProductId, UserId};

use crate::db::carts::CartRepository;
use crate::db::products::ProductRepository;
use crate::models::{Cart, CartItem, CartLine, Product};

use super::StoreError;

/// Cart service.
///
/// All operations act on the cart owned by the given user, creating it
/// lazily on first access.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Add `quantity` units of a product to the user's cart, merging into
    /// the existing line for that product if there is one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` if `quantity` is zero.
    /// Returns `StoreError::NotFound` if the user or product doesn't exist.
    /// Returns `StoreError::InsufficientStock` if the merged quantity would
    /// exceed the product's stock; the cart is left unchanged.
    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItem, StoreError> {
        validate_quantity(quantity)?;

        let cart = self.cart_for_user(user_id).await?;
        let product = self.product(product_id).await?;

        let existing = self.carts.find_item(cart.id, product_id).await?;
        let current = existing.as_ref().map_or(0, |item| item.quantity);

        // An unrepresentable merged quantity can never fit in stock either.
        let total = match current.checked_add(quantity) {
            Some(total) if total <= product.stock => total,
            _ => {
                return Err(StoreError::InsufficientStock {
                    product: product.name,
                });
            }
        };

        let item = match existing {
            Some(mut item) => {
                self.carts.update_item_quantity(item.id, total).await?;
                item.quantity = total;
                item
            }
            None => self.carts.insert_item(cart.id, product_id, total).await?,
        };

        tracing::debug!(user_id = %user_id, product_id = %product_id, quantity = total, "cart item updated");
        Ok(item)
    }

    /// Increase an owned item's quantity by one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound`/`StoreError::NotOwned` per ownership.
    /// Returns `StoreError::InsufficientStock` if stock is exhausted.
    pub async fn increase(&self, user_id: UserId, item_id: CartItemId) -> Result<(), StoreError> {
        self.change_quantity(user_id, item_id, 1).await
    }

    /// Decrease an owned item's quantity by one. Going below one is
    /// rejected; use [`remove`](Self::remove) to drop the line.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound`/`StoreError::NotOwned` per ownership.
    /// Returns `StoreError::Validation` at quantity one.
    pub async fn decrease(&self, user_id: UserId, item_id: CartItemId) -> Result<(), StoreError> {
        self.change_quantity(user_id, item_id, -1).await
    }

    /// Overwrite an owned item's quantity.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` if `quantity` is zero.
    /// Returns `StoreError::NotFound`/`StoreError::NotOwned` per ownership.
    /// Returns `StoreError::InsufficientStock` if `quantity` exceeds stock.
    pub async fn update(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<(), StoreError> {
        validate_quantity(quantity)?;

        let item = self.owned_item(user_id, item_id).await?;
        let product = self.product(item.product_id).await?;

        if quantity > product.stock {
            return Err(StoreError::InsufficientStock {
                product: product.name,
            });
        }

        self.carts.update_item_quantity(item.id, quantity).await?;
        Ok(())
    }

    /// Remove an owned item from the cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound`/`StoreError::NotOwned` per ownership.
    pub async fn remove(&self, user_id: UserId, item_id: CartItemId) -> Result<(), StoreError> {
        let item = self.owned_item(user_id, item_id).await?;
        self.carts.delete_item(item.id).await?;
        Ok(())
    }

    /// The user's cart lines with products resolved, ordered by item
    /// identity. Lazily creates the cart; otherwise side-effect free.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    pub async fn items(&self, user_id: UserId) -> Result<Vec<CartLine>, StoreError> {
        let cart = self.cart_for_user(user_id).await?;
        Ok(self.carts.lines(cart.id).await?)
    }

    /// Delete every item in the user's cart. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    pub async fn clear(&self, user_id: UserId) -> Result<(), StoreError> {
        let cart = self.cart_for_user(user_id).await?;
        self.carts.clear(cart.id).await?;
        Ok(())
    }

    /// Adjust an owned item's quantity by `delta`, all-or-nothing.
    async fn change_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        delta: i64,
    ) -> Result<(), StoreError> {
        let item = self.owned_item(user_id, item_id).await?;
        let product = self.product(item.product_id).await?;

        let updated = i64::from(item.quantity) + delta;
        if updated < 1 {
            return Err(StoreError::Validation("Quantity must be >= 1".to_owned()));
        }
        let updated = u32::try_from(updated)
            .map_err(|_| StoreError::Validation("Quantity must be >= 1".to_owned()))?;

        if updated > product.stock {
            return Err(StoreError::InsufficientStock {
                product: product.name,
            });
        }

        self.carts.update_item_quantity(item.id, updated).await?;
        Ok(())
    }

    /// Resolve an item and verify it belongs to the user's cart.
    async fn owned_item(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<CartItem, StoreError> {
        let (item, owner) = self
            .carts
            .get_item_with_owner(item_id)
            .await?
            .ok_or_else(|| StoreError::NotFound("Cart item not found".to_owned()))?;

        if owner != user_id {
            return Err(StoreError::NotOwned);
        }

        Ok(item)
    }

    async fn cart_for_user(&self, user_id: UserId) -> Result<Cart, StoreError> {
        self.carts.get_or_create(user_id).await.map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                StoreError::NotFound("User not found".to_owned())
            }
            other => StoreError::Repository(other),
        })
    }

    async fn product(&self, product_id: ProductId) -> Result<Product, StoreError> {
        self.products
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| StoreError::NotFound("Product not found".to_owned()))
    }
}

fn validate_quantity(quantity: u32) -> Result<(), StoreError> {
    if quantity < 1 {
        return Err(StoreError::Validation("Quantity must be >= 1".to_owned()));
    }
    Ok(())
}
