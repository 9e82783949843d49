//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use easyshop_core::ProductId;

use crate::db::ProductRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{NewProduct, Product};
use crate::state::AppState;

/// List all products.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// Get one product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool()).get(id).await?;
    Ok(Json(product))
}

/// Create a product.
#[instrument(skip(admin, state, input))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = ProductRepository::new(state.pool()).create(&input).await?;
    tracing::info!(admin_id = %admin.user_id, product_id = %product.id, "Admin created product");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace every field of a product. The body's id must match the path id.
#[instrument(skip(admin, state, product))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(product): Json<Product>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool())
        .update(id, &product)
        .await?;
    tracing::info!(admin_id = %admin.user_id, product_id = %id, "Admin updated product");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a product.
#[instrument(skip(admin, state))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool()).delete(id).await?;
    tracing::info!(admin_id = %admin.user_id, product_id = %id, "Admin deleted product");
    Ok(StatusCode::NO_CONTENT)
}
