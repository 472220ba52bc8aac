//! Cart repository for cart and cart item operations.
//!
//! A cart is looked up (or lazily created) by owner; items are unique per
//! (cart, product) pair, enforced by the schema and preserved by the
//! upsert-style flow in the cart service.

use chrono::{DateTime, Utc};
use sqlx::prelude::FromRow;
use sqlx::{SqliteConnection, SqlitePool};

use shoplane_core::{CartId, CartItemId, Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Cart, CartItem, CartLine, Product};

#[derive(FromRow)]
struct CartItemRow {
    id: i64,
    cart_id: i64,
    product_id: i64,
    quantity: i64,
}

impl CartItemRow {
    fn into_item(self) -> Result<CartItem, RepositoryError> {
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "invalid cart quantity in database: {}",
                self.quantity
            ))
        })?;

        Ok(CartItem {
            id: CartItemId::new(self.id),
            cart_id: CartId::new(self.cart_id),
            product_id: ProductId::new(self.product_id),
            quantity,
        })
    }
}

/// Joined cart item + product row, ordered by item identity.
#[derive(FromRow)]
struct CartLineRow {
    #[sqlx(flatten)]
    item: CartItemRow,
    product_name: String,
    product_category: String,
    product_price: String,
    product_stock: i64,
    product_image_url: Option<String>,
    product_created_at: DateTime<Utc>,
}

impl CartLineRow {
    fn into_line(self) -> Result<CartLine, RepositoryError> {
        let price = Price::parse(&self.product_price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;
        let stock = u32::try_from(self.product_stock).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative stock in database: {}",
                self.product_stock
            ))
        })?;

        let product_id = ProductId::new(self.item.product_id);
        let item = self.item.into_item()?;

        Ok(CartLine {
            item,
            product: Product {
                id: product_id,
                name: self.product_name,
                category: self.product_category,
                price,
                stock,
                image_url: self.product_image_url,
                created_at: self.product_created_at,
            },
        })
    }
}

const CART_LINE_QUERY: &str = "SELECT ci.id, ci.cart_id, ci.product_id, ci.quantity, \
     p.name AS product_name, p.category AS product_category, p.price AS product_price, \
     p.stock AS product_stock, p.image_url AS product_image_url, \
     p.created_at AS product_created_at \
     FROM cart_items ci JOIN products p ON p.id = ci.product_id \
     WHERE ci.cart_id = ? ORDER BY ci.id";

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the user's cart, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        if let Some(cart) = self.get_by_user(user_id).await? {
            return Ok(cart);
        }

        let user_exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        if user_exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        // Lost race against a concurrent create is fine: the unique
        // constraint keeps one row and the re-select finds it.
        sqlx::query("INSERT INTO carts (user_id) VALUES (?) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        self.get_by_user(user_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Get the user's cart if one exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let row: Option<(i64, i64)> =
            sqlx::query_as("SELECT id, user_id FROM carts WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(|(id, owner)| Cart {
            id: CartId::new(id),
            user_id: UserId::new(owner),
        }))
    }

    /// Get the user's cart inside an open transaction, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user_in_tx(
        conn: &mut SqliteConnection,
        user_id: UserId,
    ) -> Result<Option<Cart>, RepositoryError> {
        let row: Option<(i64, i64)> =
            sqlx::query_as("SELECT id, user_id FROM carts WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(conn)
                .await?;

        Ok(row.map(|(id, owner)| Cart {
            id: CartId::new(id),
            user_id: UserId::new(owner),
        }))
    }

    /// List the cart's items with their products, ordered by item identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows: Vec<CartLineRow> = sqlx::query_as(CART_LINE_QUERY)
            .bind(cart_id)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(CartLineRow::into_line).collect()
    }

    /// List the cart's items with their products inside an open transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn lines_in_tx(
        conn: &mut SqliteConnection,
        cart_id: CartId,
    ) -> Result<Vec<CartLine>, RepositoryError> {
        let rows: Vec<CartLineRow> = sqlx::query_as(CART_LINE_QUERY)
            .bind(cart_id)
            .fetch_all(conn)
            .await?;

        rows.into_iter().map(CartLineRow::into_line).collect()
    }

    /// Find the cart's item for one product, if present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let row: Option<CartItemRow> = sqlx::query_as(
            "SELECT id, cart_id, product_id, quantity FROM cart_items \
             WHERE cart_id = ? AND product_id = ?",
        )
        .bind(cart_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(CartItemRow::into_item).transpose()
    }

    /// Get a cart item together with the ID of the user owning its cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_item_with_owner(
        &self,
        item_id: CartItemId,
    ) -> Result<Option<(CartItem, UserId)>, RepositoryError> {
        let row: Option<CartItemOwnerRow> = sqlx::query_as(
            "SELECT ci.id, ci.cart_id, ci.product_id, ci.quantity, c.user_id AS owner_id \
             FROM cart_items ci JOIN carts c ON c.id = ci.cart_id \
             WHERE ci.id = ?",
        )
        .bind(item_id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => {
                let owner = UserId::new(r.owner_id);
                Ok(Some((r.item.into_item()?, owner)))
            }
            None => Ok(None),
        }
    }

    /// Insert a new item for (cart, product).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if an item for the pair already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItem, RepositoryError> {
        let result =
            sqlx::query("INSERT INTO cart_items (cart_id, product_id, quantity) VALUES (?, ?, ?)")
                .bind(cart_id)
                .bind(product_id)
                .bind(i64::from(quantity))
                .execute(self.pool)
                .await
                .map_err(|e| {
                    if let sqlx::Error::Database(ref db_err) = e
                        && db_err.is_unique_violation()
                    {
                        return RepositoryError::Conflict(
                            "cart already has an item for this product".to_owned(),
                        );
                    }
                    RepositoryError::Database(e)
                })?;

        Ok(CartItem {
            id: CartItemId::new(result.last_insert_rowid()),
            cart_id,
            product_id,
            quantity,
        })
    }

    /// Overwrite an item's quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_item_quantity(
        &self,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE cart_items SET quantity = ? WHERE id = ?")
            .bind(i64::from(quantity))
            .bind(item_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete an item.
    ///
    /// # Returns
    ///
    /// Returns `true` if the item was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_item(&self, item_id: CartItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = ?")
            .bind(item_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete all items of a cart. A no-op for an already empty cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Delete all items of a cart inside an open transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_in_tx(
        conn: &mut SqliteConnection,
        cart_id: CartId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
            .bind(cart_id)
            .execute(conn)
            .await?;

        Ok(())
    }
}

#[derive(FromRow)]
struct CartItemOwnerRow {
    #[sqlx(flatten)]
    item: CartItemRow,
    owner_id: i64,
}
