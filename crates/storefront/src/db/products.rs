//! Product repository for database operations.

use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use tracing::instrument;

use easyshop_core::{CategoryId, ProductId, rules};

use super::{RepositoryError, is_foreign_key_violation};
use crate::models::{NewProduct, Product};

/// Column list shared by every query that maps to [`ProductRow`].
pub(super) const PRODUCT_COLUMNS: &str = "product_id, name, price, category_id, description, \
     subcategory, stock, featured, image_url";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductRow {
    product_id: i32,
    name: String,
    price: Decimal,
    category_id: i32,
    description: String,
    subcategory: String,
    stock: i32,
    featured: bool,
    image_url: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.product_id),
            name: row.name,
            price: row.price,
            category_id: CategoryId::new(row.category_id),
            description: row.description,
            subcategory: row.subcategory,
            stock: row.stock,
            featured: row.featured,
            image_url: row.image_url,
        }
    }
}

pub(super) async fn fetch_product<'e>(
    executor: impl PgExecutor<'e>,
    id: ProductId,
) -> Result<Option<Product>, sqlx::Error> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Product::from))
}

/// Map a write error, reporting a dangling `category_id` as a validation failure.
fn map_write_error(err: sqlx::Error, category_id: CategoryId) -> RepositoryError {
    if is_foreign_key_violation(&err) {
        return RepositoryError::Validation(format!("category {category_id} does not exist"));
    }
    RepositoryError::Database(err)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY product_id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Product, RepositoryError> {
        fetch_product(self.pool, id)
            .await?
            .ok_or(RepositoryError::NotFound("product"))
    }

    /// Create a product and return it as persisted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for invalid fields or a
    /// `category_id` that does not exist.
    /// Returns `RepositoryError::Database` if the insert or re-read fails.
    #[instrument(skip(self, input), fields(name = %input.name, category_id = %input.category_id))]
    pub async fn create(&self, input: &NewProduct) -> Result<Product, RepositoryError> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO products (
                name, price, category_id, description,
                subcategory, stock, featured, image_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING product_id
            ",
        )
        .bind(&input.name)
        .bind(input.price)
        .bind(input.category_id)
        .bind(&input.description)
        .bind(&input.subcategory)
        .bind(input.stock)
        .bind(input.featured)
        .bind(&input.image_url)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, input.category_id))?;

        let product = fetch_product(&mut *tx, ProductId::new(id))
            .await?
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!("created product {id} is not readable"))
            })?;

        tx.commit().await?;

        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Replace every field of a product.
    ///
    /// `id` comes from the request path and must equal `product.id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` on an id mismatch, invalid
    /// fields, or a `category_id` that does not exist.
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    /// Returns `RepositoryError::Conflict` if more than one row was updated.
    #[instrument(skip(self, product))]
    pub async fn update(&self, id: ProductId, product: &Product) -> Result<(), RepositoryError> {
        rules::ensure_ids_match(id, product.id)
            .map_err(|v| RepositoryError::from_rule(v, "product"))?;
        product.validate()?;

        let result = sqlx::query(
            r"
            UPDATE products
            SET name = $1, price = $2, category_id = $3, description = $4,
                subcategory = $5, stock = $6, featured = $7, image_url = $8
            WHERE product_id = $9
            ",
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(product.category_id)
        .bind(&product.description)
        .bind(&product.subcategory)
        .bind(product.stock)
        .bind(product.featured)
        .bind(&product.image_url)
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| map_write_error(e, product.category_id))?;

        rules::expect_single_row(result.rows_affected())
            .map_err(|v| RepositoryError::from_rule(v, "product"))?;

        tracing::info!(product_id = %id, "Product updated");
        Ok(())
    }

    /// Delete a product. Cart rows holding it are removed by the schema's cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        rules::expect_single_row(result.rows_affected())
            .map_err(|v| RepositoryError::from_rule(v, "product"))?;

        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }
}
