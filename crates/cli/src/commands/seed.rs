//! Seed the catalog from a YAML file.
//!
//! The file lists categories with their products nested underneath:
//!
//! ```yaml
//! categories:
//!   - name: Games
//!     description: Console and PC games
//!     products:
//!       - name: Halo Infinite
//!         price: "59.99"
//!         stock: 25
//!         featured: true
//! ```
//!
//! The whole file is validated before the database is touched, so a typo
//! halfway down fails the run before anything is inserted. Inserts are not
//! one transaction: a database error partway through leaves the earlier
//! entries in place. Categories and products that already exist (matched by
//! trimmed, case-insensitive name) are skipped, so re-running the same file
//! finishes an interrupted run instead of duplicating the catalog.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use easyshop_core::CategoryId;
use easyshop_storefront::db::{CategoryRepository, ProductRepository};
use easyshop_storefront::models::{Category, NewCategory, NewProduct};

use super::{CommandError, connect};

/// Top-level catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub categories: Vec<CategorySeed>,
}

/// A category and the products filed under it.
#[derive(Debug, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
pub struct ProductSeed {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub image_url: String,
}

impl CategorySeed {
    fn to_new_category(&self) -> NewCategory {
        NewCategory {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

impl ProductSeed {
    fn to_new_product(&self, category_id: CategoryId) -> NewProduct {
        NewProduct {
            name: self.name.clone(),
            price: self.price,
            category_id,
            description: self.description.clone(),
            subcategory: self.subcategory.clone(),
            stock: self.stock,
            featured: self.featured,
            image_url: self.image_url.clone(),
        }
    }
}

/// Counts reported after a seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
    pub skipped_categories: usize,
    pub skipped_products: usize,
}

/// Key used to match seed entries against existing rows.
fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Products from `seeds` whose names are not already in `present`.
fn pending_products<'a>(
    seeds: &'a [ProductSeed],
    present: &HashSet<String>,
) -> Vec<&'a ProductSeed> {
    seeds
        .iter()
        .filter(|seed| !present.contains(&name_key(&seed.name)))
        .collect()
}

/// Check every entry in the file, collecting all problems rather than
/// stopping at the first.
#[must_use]
pub fn validate_catalog(catalog: &CatalogFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    if catalog.categories.is_empty() {
        errors.push("catalog has no categories".to_string());
    }

    for (i, category) in catalog.categories.iter().enumerate() {
        let label = format!("categories[{i}]");
        if let Err(e) = category.to_new_category().validate() {
            errors.push(format!("{label}: {e}"));
        }
        if !seen.insert(name_key(&category.name)) {
            errors.push(format!("{label}: duplicate category '{}'", category.name));
        }

        // The real id is assigned on insert; validation does not look at it.
        let placeholder = CategoryId::new(0);
        for (j, product) in category.products.iter().enumerate() {
            if let Err(e) = product.to_new_product(placeholder).validate() {
                errors.push(format!("{label}.products[{j}]: {e}"));
            }
        }
    }

    errors
}

/// Insert every missing category, then its missing products under the
/// category's id.
async fn seed(pool: &PgPool, catalog: &CatalogFile) -> Result<SeedSummary, CommandError> {
    let categories = CategoryRepository::new(pool);
    let products = ProductRepository::new(pool);
    let mut summary = SeedSummary::default();

    let existing: HashMap<String, Category> = categories
        .list()
        .await?
        .into_iter()
        .map(|category| (name_key(&category.name), category))
        .collect();

    for entry in &catalog.categories {
        let (category, present) = match existing.get(&name_key(&entry.name)) {
            Some(found) => {
                summary.skipped_categories += 1;
                let present: HashSet<String> = categories
                    .list_products(found.id)
                    .await?
                    .iter()
                    .map(|product| name_key(&product.name))
                    .collect();
                (found.clone(), present)
            }
            None => {
                let created = categories.create(&entry.to_new_category()).await?;
                summary.categories += 1;
                (created, HashSet::new())
            }
        };

        let pending = pending_products(&entry.products, &present);
        summary.skipped_products += entry.products.len() - pending.len();
        for product in &pending {
            products.create(&product.to_new_product(category.id)).await?;
            summary.products += 1;
        }

        info!(
            category_id = %category.id,
            name = %category.name,
            inserted = pending.len(),
            skipped = entry.products.len() - pending.len(),
            "Seeded category"
        );
    }

    Ok(summary)
}

/// Parse a catalog file's contents.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or fails validation.
pub fn parse_catalog(content: &str) -> Result<CatalogFile, CommandError> {
    let catalog: CatalogFile = serde_yaml::from_str(content)?;

    let errors = validate_catalog(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CommandError::Invalid(errors));
    }

    Ok(catalog)
}

/// Seed categories and products from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is invalid, the database
/// URL is missing, or an insert fails.
pub async fn catalog(file_path: &str) -> Result<(), CommandError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading catalog from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: file_path.to_string(),
            source,
        })?;
    let catalog = parse_catalog(&content)?;
    info!(categories = catalog.categories.len(), "Catalog validated");

    let pool = connect().await?;
    let summary = seed(&pool, &catalog).await?;

    info!("Seeding complete!");
    info!("  Categories inserted: {}", summary.categories);
    info!("  Products inserted: {}", summary.products);
    info!(
        "  Already present: {} categories, {} products",
        summary.skipped_categories, summary.skipped_products
    );

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_is_valid() {
        let catalog = parse_catalog(include_str!("../../data/catalog.yaml")).unwrap();
        assert!(!catalog.categories.is_empty());
        assert!(catalog.categories.iter().any(|c| !c.products.is_empty()));
    }

    #[test]
    fn test_defaults_and_decimal_price() {
        let catalog = parse_catalog(
            r#"
categories:
  - name: Games
    products:
      - name: Halo Infinite
        price: "59.99"
"#,
        )
        .unwrap();

        let games = &catalog.categories[0];
        assert_eq!(games.description, "");
        let halo = &games.products[0];
        assert_eq!(halo.price, Decimal::new(5999, 2));
        assert_eq!(halo.stock, 0);
        assert!(!halo.featured);
    }

    #[test]
    fn test_validation_collects_every_error() {
        let catalog: CatalogFile = serde_yaml::from_str(
            r#"
categories:
  - name: Games
    products:
      - name: ""
        price: "10.00"
      - name: Refund
        price: "-1.00"
  - name: games
  - name: Music
    products:
      - name: Vinyl
        price: "20.00"
        stock: -3
"#,
        )
        .unwrap();

        let errors = validate_catalog(&catalog);
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors[0].starts_with("categories[0].products[0]"));
        assert!(errors[1].contains("price"));
        assert!(errors[2].contains("duplicate category"));
        assert!(errors[3].contains("stock"));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let err = parse_catalog("categories: []").unwrap_err();
        assert!(matches!(err, CommandError::Invalid(ref errors) if errors.len() == 1));
    }

    #[test]
    fn test_existing_products_are_not_reseeded() {
        let catalog = parse_catalog(
            r#"
categories:
  - name: Games
    products:
      - name: Halo Infinite
        price: "59.99"
      - name: Doom
        price: "19.99"
      - name: Portal 2
        price: "9.99"
"#,
        )
        .unwrap();
        let seeds = &catalog.categories[0].products;

        let present: HashSet<String> = [" halo infinite", "PORTAL 2"]
            .iter()
            .map(|name| name_key(name))
            .collect();
        let pending = pending_products(seeds, &present);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].name, "Doom");

        assert_eq!(pending_products(seeds, &HashSet::new()).len(), 3);
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let err = parse_catalog("categories:\n  - description: no name").unwrap_err();
        assert!(matches!(err, CommandError::Yaml(_)));
    }
}
