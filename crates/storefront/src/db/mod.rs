//! Database operations for the storefront `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `categories` - Catalog categories
//! - `products` - Catalog products (`category_id` references `categories`)
//! - `shopping_cart` - One row per `(user_id, product_id)` with a positive quantity
//!
//! # Repositories
//!
//! - [`CategoryRepository`] and [`ProductRepository`] own the catalog rows.
//! - [`CartRepository`] owns the cart rows and reads (never writes) products
//!   to build cart views.
//!
//! Every multi-statement operation runs in a single transaction; a failure at
//! any step rolls the whole operation back when the transaction is dropped.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p easyshop-cli -- migrate
//! ```

pub mod cart;
pub mod categories;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use easyshop_core::RuleViolation;

use crate::models::ValidationError;

pub use cart::CartRepository;
pub use categories::CategoryRepository;
pub use products::ProductRepository;

/// Embedded storefront migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx (connectivity, driver, timeout).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity (or the parent it hangs off) was not found.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Caller-supplied data is invalid (e.g., id mismatch, blank name).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The write matched an unexpected number of rows or hit a constraint.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Translate a consistency-rule violation for the given entity.
    #[must_use]
    pub fn from_rule(violation: RuleViolation, entity: &'static str) -> Self {
        match violation {
            RuleViolation::IdMismatch { .. } => Self::Validation(violation.to_string()),
            RuleViolation::NoRowAffected | RuleViolation::LineAbsent => Self::NotFound(entity),
            RuleViolation::UnexpectedRowCount(_) | RuleViolation::QuantityOverflow(_) => {
                Self::Conflict(format!("{entity}: {violation}"))
            }
        }
    }
}

impl From<ValidationError> for RepositoryError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.0)
    }
}

/// Whether a sqlx error is a foreign-key violation.
fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

/// Whether a sqlx error is Postgres `numeric_value_out_of_range` (SQLSTATE 22003).
fn is_out_of_range(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("22003"))
}

/// Whether a sqlx error is a unique or primary-key violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
