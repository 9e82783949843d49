//! Domain models for the storefront.
//!
//! These types represent validated domain objects separate from database row types.

pub mod actor;
pub mod cart;
pub mod catalog;

use thiserror::Error;

pub use actor::Actor;
pub use cart::{ShoppingCart, ShoppingCartItem};
pub use catalog::{Category, NewCategory, NewProduct, Product};

/// User-supplied data that fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);
