//! Catalog integration tests.
//!
//! These tests require a `PostgreSQL` database named by `TEST_DATABASE_URL`.
//!
//! Run with: cargo test -p easyshop-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use easyshop_core::{CategoryId, ProductId};
use easyshop_integration_tests::{create_category, create_product, test_pool, unique_name};
use easyshop_storefront::db::{CategoryRepository, ProductRepository, RepositoryError};
use easyshop_storefront::models::{NewCategory, NewProduct};

// =============================================================================
// Categories
// =============================================================================

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_create_category_returns_persisted_row() {
    let pool = test_pool().await;
    let categories = CategoryRepository::new(&pool);
    let name = unique_name("Games");

    let created = categories
        .create(&NewCategory {
            name: name.clone(),
            description: "Console and PC games".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(created.name, name);
    assert_eq!(categories.get(created.id).await.unwrap(), created);
    assert!(categories.list().await.unwrap().contains(&created));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_update_category_with_mismatched_id_leaves_row_unchanged() {
    let pool = test_pool().await;
    let categories = CategoryRepository::new(&pool);
    let category = create_category(&pool, "Games").await;
    let before = categories.get(category.id).await.unwrap();

    let mut renamed = before.clone();
    renamed.name = "Renamed".to_string();
    renamed.id = CategoryId::new(category.id.as_i32() + 1);

    let err = categories.update(category.id, &renamed).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));

    let after = categories.get(category.id).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_update_category_replaces_fields() {
    let pool = test_pool().await;
    let categories = CategoryRepository::new(&pool);
    let mut category = create_category(&pool, "Games").await;

    category.description = "Retro titles only".to_string();
    categories.update(category.id, &category).await.unwrap();

    assert_eq!(categories.get(category.id).await.unwrap(), category);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_missing_category_is_not_found() {
    let pool = test_pool().await;
    let categories = CategoryRepository::new(&pool);
    let missing = CategoryId::new(i32::MAX);

    assert!(matches!(
        categories.get(missing).await.unwrap_err(),
        RepositoryError::NotFound("category")
    ));
    assert!(matches!(
        categories.delete(missing).await.unwrap_err(),
        RepositoryError::NotFound("category")
    ));

    let mut ghost = create_category(&pool, "Ghost").await;
    ghost.id = missing;
    assert!(matches!(
        categories.update(missing, &ghost).await.unwrap_err(),
        RepositoryError::NotFound("category")
    ));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_list_products_distinguishes_missing_from_empty() {
    let pool = test_pool().await;
    let categories = CategoryRepository::new(&pool);

    let err = categories
        .list_products(CategoryId::new(i32::MAX))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound("category")));

    let empty = create_category(&pool, "Empty").await;
    assert!(categories.list_products(empty.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_list_products_returns_only_that_category() {
    let pool = test_pool().await;
    let games = create_category(&pool, "Games").await;
    let books = create_category(&pool, "Books").await;
    let halo = create_product(&pool, &games, "59.99").await;
    let doom = create_product(&pool, &games, "19.99").await;
    create_product(&pool, &books, "39.00").await;

    let products = CategoryRepository::new(&pool)
        .list_products(games.id)
        .await
        .unwrap();
    let ids: Vec<ProductId> = products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![halo.id, doom.id]);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_delete_category_with_products_conflicts() {
    let pool = test_pool().await;
    let categories = CategoryRepository::new(&pool);
    let games = create_category(&pool, "Games").await;
    let product = create_product(&pool, &games, "59.99").await;

    let err = categories.delete(games.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    ProductRepository::new(&pool)
        .delete(product.id)
        .await
        .unwrap();
    categories.delete(games.id).await.unwrap();
    assert!(matches!(
        categories.get(games.id).await.unwrap_err(),
        RepositoryError::NotFound(_)
    ));
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_create_product_returns_persisted_row() {
    let pool = test_pool().await;
    let games = create_category(&pool, "Games").await;
    let products = ProductRepository::new(&pool);

    let created = products
        .create(&NewProduct {
            name: "Halo Infinite".to_string(),
            price: Decimal::new(5999, 2),
            category_id: games.id,
            description: "Master Chief returns".to_string(),
            subcategory: "Shooter".to_string(),
            stock: 25,
            featured: true,
            image_url: "halo.jpg".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(created.price, Decimal::new(5999, 2));
    assert!(created.featured);
    assert_eq!(products.get(created.id).await.unwrap(), created);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_product_with_unknown_category_is_rejected() {
    let pool = test_pool().await;
    let products = ProductRepository::new(&pool);

    let err = products
        .create(&NewProduct {
            name: "Orphan".to_string(),
            price: Decimal::ONE,
            category_id: CategoryId::new(i32::MAX),
            description: String::new(),
            subcategory: String::new(),
            stock: 0,
            featured: false,
            image_url: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_update_product_replaces_every_field() {
    let pool = test_pool().await;
    let games = create_category(&pool, "Games").await;
    let books = create_category(&pool, "Books").await;
    let products = ProductRepository::new(&pool);
    let product = create_product(&pool, &games, "59.99").await;

    let mut replacement = product.clone();
    replacement.name = "Halo: The Art Book".to_string();
    replacement.price = Decimal::new(3900, 2);
    replacement.category_id = books.id;
    replacement.description = "Hardcover".to_string();
    replacement.subcategory = "Art".to_string();
    replacement.stock = 3;
    replacement.featured = true;
    replacement.image_url = "art.jpg".to_string();

    products.update(product.id, &replacement).await.unwrap();
    assert_eq!(products.get(product.id).await.unwrap(), replacement);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_update_product_with_mismatched_id_is_rejected() {
    let pool = test_pool().await;
    let games = create_category(&pool, "Games").await;
    let products = ProductRepository::new(&pool);
    let product = create_product(&pool, &games, "59.99").await;

    let mut other = product.clone();
    other.id = ProductId::new(product.id.as_i32() + 1);
    other.price = Decimal::ZERO;

    let err = products.update(product.id, &other).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));
    assert_eq!(products.get(product.id).await.unwrap(), product);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_missing_product_is_not_found() {
    let pool = test_pool().await;
    let products = ProductRepository::new(&pool);
    let missing = ProductId::new(i32::MAX);

    assert!(matches!(
        products.get(missing).await.unwrap_err(),
        RepositoryError::NotFound("product")
    ));
    assert!(matches!(
        products.delete(missing).await.unwrap_err(),
        RepositoryError::NotFound("product")
    ));
}
