//! Shopping cart repository for database operations.
//!
//! Cart rows are `(user_id, product_id, quantity)` tuples. Reads join them with
//! the current product rows to build a [`ShoppingCart`] view.
//!
//! # Concurrency
//!
//! Add and remove are read-modify-write sequences. Each runs in one
//! transaction that locks the `(user_id, product_id)` row with
//! `SELECT ... FOR UPDATE` before deciding the write, so concurrent calls on
//! the same key serialize in the database and no increment or decrement is
//! lost, even across process instances. When the row does not exist yet there
//! is nothing to lock, so the insert is an upsert: a racing add that inserted
//! first turns the second insert into an increment.

use sqlx::{PgConnection, PgExecutor, PgPool};
use tracing::instrument;

use easyshop_core::{LineChange, ProductId, RuleViolation, UserId, rules};

use super::products::{PRODUCT_COLUMNS, ProductRow};
use super::{RepositoryError, is_foreign_key_violation, is_out_of_range, is_unique_violation};
use crate::models::{Product, ShoppingCart, ShoppingCartItem};

// =============================================================================
// Internal Row Types
// =============================================================================

/// A cart row joined with its product.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    quantity: i32,
    #[sqlx(flatten)]
    product: ProductRow,
}

impl From<CartLineRow> for ShoppingCartItem {
    fn from(row: CartLineRow) -> Self {
        Self::new(Product::from(row.product), row.quantity)
    }
}

async fn fetch_cart<'e>(
    executor: impl PgExecutor<'e>,
    user_id: UserId,
) -> Result<ShoppingCart, sqlx::Error> {
    let rows = sqlx::query_as::<_, CartLineRow>(&format!(
        r"
        SELECT quantity, {PRODUCT_COLUMNS}
        FROM shopping_cart
        JOIN products USING (product_id)
        WHERE user_id = $1
        ORDER BY product_id
        "
    ))
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(ShoppingCartItem::from).collect())
}

/// Lock the cart row for `(user_id, product_id)` and return its quantity.
async fn lock_line(
    conn: &mut PgConnection,
    user_id: UserId,
    product_id: ProductId,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar(
        r"
        SELECT quantity
        FROM shopping_cart
        WHERE user_id = $1 AND product_id = $2
        FOR UPDATE
        ",
    )
    .bind(user_id)
    .bind(product_id)
    .fetch_optional(conn)
    .await
}

/// Perform the write chosen by the consistency rules. Exactly one row must change.
async fn apply_line_change(
    conn: &mut PgConnection,
    user_id: UserId,
    product_id: ProductId,
    change: LineChange,
) -> Result<(), RepositoryError> {
    let result = match change {
        LineChange::Insert { quantity } => {
            sqlx::query(
                r"
                INSERT INTO shopping_cart (user_id, product_id, quantity)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, product_id)
                DO UPDATE SET quantity = shopping_cart.quantity + EXCLUDED.quantity
                ",
            )
            .bind(user_id)
            .bind(product_id)
            .bind(quantity)
            .execute(conn)
            .await
            .map_err(|e| {
                // A racing add may have pushed the line to the maximum first
                if is_out_of_range(&e) {
                    return RepositoryError::from_rule(
                        RuleViolation::QuantityOverflow(i32::MAX),
                        "cart item",
                    );
                }
                RepositoryError::Database(e)
            })?
        }
        LineChange::SetQuantity(quantity) => {
            sqlx::query(
                r"
                UPDATE shopping_cart
                SET quantity = $3
                WHERE user_id = $1 AND product_id = $2
                ",
            )
            .bind(user_id)
            .bind(product_id)
            .bind(quantity)
            .execute(conn)
            .await?
        }
        LineChange::Delete => {
            sqlx::query("DELETE FROM shopping_cart WHERE user_id = $1 AND product_id = $2")
                .bind(user_id)
                .bind(product_id)
                .execute(conn)
                .await?
        }
    };

    rules::expect_single_row(result.rows_affected())
        .map_err(|v| RepositoryError::from_rule(v, "cart item"))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for shopping cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Build the user's cart from their rows and the current product data.
    ///
    /// A user with no rows gets an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<ShoppingCart, RepositoryError> {
        Ok(fetch_cart(self.pool, user_id).await?)
    }

    /// Add one unit of a product to the user's cart.
    ///
    /// Inserts the line with quantity 1, or increments the existing line.
    /// Returns the refreshed cart, read in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if the line is already at the maximum quantity.
    /// Returns `RepositoryError::Database` if any statement fails; nothing is written.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<ShoppingCart, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Share lock keeps the product from being deleted until we commit
        let product: Option<i32> = sqlx::query_scalar(
            "SELECT product_id FROM products WHERE product_id = $1 FOR SHARE",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        if product.is_none() {
            return Err(RepositoryError::NotFound("product"));
        }

        let current = lock_line(&mut tx, user_id, product_id).await?;
        let change =
            rules::on_add(current).map_err(|v| RepositoryError::from_rule(v, "cart item"))?;
        apply_line_change(&mut tx, user_id, product_id, change).await?;

        let cart = fetch_cart(&mut *tx, user_id).await?;
        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            product_id = %product_id,
            quantity = cart.quantity_of(product_id),
            "Added product to cart"
        );
        Ok(cart)
    }

    /// Swap a line item for a different product, keeping its quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the replacement product is malformed.
    /// Returns `RepositoryError::NotFound` if the user has no line for `product_id`
    /// or the replacement product does not exist.
    /// Returns `RepositoryError::Conflict` if the replacement is already in the cart.
    #[instrument(skip(self, replacement), fields(replacement_id = %replacement.id))]
    pub async fn update_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        replacement: &Product,
    ) -> Result<(), RepositoryError> {
        replacement.validate()?;

        let result = sqlx::query(
            r"
            UPDATE shopping_cart
            SET product_id = $1
            WHERE user_id = $2 AND product_id = $3
            ",
        )
        .bind(replacement.id)
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                return RepositoryError::NotFound("product");
            }
            if is_unique_violation(&e) {
                return RepositoryError::Conflict(format!(
                    "product {} is already in the cart",
                    replacement.id
                ));
            }
            RepositoryError::Database(e)
        })?;

        rules::expect_single_row(result.rows_affected())
            .map_err(|v| RepositoryError::from_rule(v, "cart item"))?;

        tracing::info!(
            user_id = %user_id,
            product_id = %product_id,
            replacement_id = %replacement.id,
            "Replaced cart item"
        );
        Ok(())
    }

    /// Remove one unit of a product from the user's cart.
    ///
    /// Decrements the line, deleting it when the quantity reaches the
    /// boundary of one. Returns the refreshed cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the cart.
    /// Returns `RepositoryError::Database` if any statement fails; nothing is written.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<ShoppingCart, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = lock_line(&mut tx, user_id, product_id).await?;
        let change =
            rules::on_remove(current).map_err(|v| RepositoryError::from_rule(v, "cart item"))?;
        apply_line_change(&mut tx, user_id, product_id, change).await?;

        let cart = fetch_cart(&mut *tx, user_id).await?;
        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            product_id = %product_id,
            quantity = cart.quantity_of(product_id),
            "Removed product from cart"
        );
        Ok(cart)
    }

    /// Delete every line in the user's cart.
    ///
    /// Emptying an already-empty cart succeeds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    #[instrument(skip(self))]
    pub async fn empty(&self, user_id: UserId) -> Result<ShoppingCart, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM shopping_cart WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let cart = fetch_cart(&mut *tx, user_id).await?;
        tx.commit().await?;

        tracing::info!(user_id = %user_id, removed = result.rows_affected(), "Emptied cart");
        Ok(cart)
    }
}
