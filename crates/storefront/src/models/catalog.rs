//! Catalog domain types.
//!
//! JSON field names follow the storefront's public API (`categoryId`,
//! `productId`, `imageUrl`); `id` is accepted as an alias on input.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use easyshop_core::{CategoryId, ProductId};

use super::ValidationError;

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "categoryId", alias = "id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Fields supplied when creating a category.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl NewCategory {
    /// Validate user-supplied fields.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("category", &self.name)
    }
}

impl Category {
    /// Validate the replaceable fields of an existing category.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("category", &self.name)
    }
}

/// A product in the catalog.
///
/// `category_id` is a foreign key into the categories table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "productId", alias = "id")]
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub category_id: CategoryId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub stock: i32,
    #[serde(default, rename = "isFeatured", alias = "featured")]
    pub featured: bool,
    #[serde(default)]
    pub image_url: String,
}

impl Product {
    /// Validate the replaceable fields of an existing product.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a blank name, negative price or negative stock.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_product_fields(&self.name, self.price, self.stock)
    }
}

/// Fields supplied when creating a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub category_id: CategoryId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub stock: i32,
    #[serde(default, rename = "isFeatured", alias = "featured")]
    pub featured: bool,
    #[serde(default)]
    pub image_url: String,
}

impl NewProduct {
    /// Validate user-supplied fields.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a blank name, negative price or negative stock.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_product_fields(&self.name, self.price, self.stock)
    }
}

fn validate_name(entity: &str, name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError(format!("{entity} name must not be blank")));
    }
    Ok(())
}

fn validate_product_fields(name: &str, price: Decimal, stock: i32) -> Result<(), ValidationError> {
    validate_name("product", name)?;
    if price < Decimal::ZERO {
        return Err(ValidationError(format!(
            "product price must not be negative (got {price})"
        )));
    }
    if stock < 0 {
        return Err(ValidationError(format!(
            "product stock must not be negative (got {stock})"
        )));
    }
    Ok(())
}
