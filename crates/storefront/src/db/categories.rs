//! Category repository for database operations.
//!
//! Listing products by category checks the category first, so a missing
//! category is reported as `NotFound` rather than as an empty listing.

use sqlx::{PgExecutor, PgPool};
use tracing::instrument;

use easyshop_core::{CategoryId, rules};

use super::products::{PRODUCT_COLUMNS, ProductRow};
use super::{RepositoryError, is_foreign_key_violation};
use crate::models::{Category, NewCategory, Product};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for category queries.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    category_id: i32,
    name: String,
    description: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.category_id),
            name: row.name,
            description: row.description,
        }
    }
}

async fn fetch_category<'e>(
    executor: impl PgExecutor<'e>,
    id: CategoryId,
) -> Result<Option<Category>, sqlx::Error> {
    let row = sqlx::query_as::<_, CategoryRow>(
        r"
        SELECT category_id, name, description
        FROM categories
        WHERE category_id = $1
        ",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Category::from))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT category_id, name, description
            FROM categories
            ORDER BY category_id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no category has this ID.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Category, RepositoryError> {
        fetch_category(self.pool, id)
            .await?
            .ok_or(RepositoryError::NotFound("category"))
    }

    /// Create a category and return it as persisted.
    ///
    /// The row is re-read by its generated ID inside the same transaction so
    /// any server-side defaults are reflected in the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the name is blank.
    /// Returns `RepositoryError::Database` if the insert or re-read fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &NewCategory) -> Result<Category, RepositoryError> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING category_id
            ",
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&mut *tx)
        .await?;

        let category = fetch_category(&mut *tx, CategoryId::new(id))
            .await?
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!("created category {id} is not readable"))
            })?;

        tx.commit().await?;

        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    /// Replace a category's name and description.
    ///
    /// `id` comes from the request path and must equal `category.id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` on an id mismatch or a blank name;
    /// the stored row is left untouched.
    /// Returns `RepositoryError::NotFound` if no category has this ID.
    /// Returns `RepositoryError::Conflict` if more than one row was updated.
    #[instrument(skip(self, category))]
    pub async fn update(&self, id: CategoryId, category: &Category) -> Result<(), RepositoryError> {
        rules::ensure_ids_match(id, category.id)
            .map_err(|v| RepositoryError::from_rule(v, "category"))?;
        category.validate()?;

        let result = sqlx::query(
            r"
            UPDATE categories
            SET name = $1, description = $2
            WHERE category_id = $3
            ",
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(id)
        .execute(self.pool)
        .await?;

        rules::expect_single_row(result.rows_affected())
            .map_err(|v| RepositoryError::from_rule(v, "category"))?;

        tracing::info!(category_id = %id, "Category updated");
        Ok(())
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no category has this ID.
    /// Returns `RepositoryError::Conflict` if products still reference it.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE category_id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    return RepositoryError::Conflict(format!(
                        "category {id} still has products"
                    ));
                }
                RepositoryError::Database(e)
            })?;

        rules::expect_single_row(result.rows_affected())
            .map_err(|v| RepositoryError::from_rule(v, "category"))?;

        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }

    /// List the products in a category.
    ///
    /// The category row is share-locked for the duration of the listing so it
    /// cannot be deleted between the existence check and the product read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// An existing category with no products yields an empty vector.
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, id: CategoryId) -> Result<Vec<Product>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i32> = sqlx::query_scalar(
            r"
            SELECT category_id
            FROM categories
            WHERE category_id = $1
            FOR SHARE
            ",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if exists.is_none() {
            return Err(RepositoryError::NotFound("category"));
        }

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE category_id = $1 ORDER BY product_id"
        ))
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
