//! Category route handlers.
//!
//! Reads are public; create, update and delete require an admin.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use easyshop_core::CategoryId;

use crate::db::CategoryRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Category, NewCategory, Product};
use crate::state::AppState;

/// List all categories.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories))
}

/// Get one category.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>> {
    let category = CategoryRepository::new(state.pool()).get(id).await?;
    Ok(Json(category))
}

/// List the products of a category; 404 if the category does not exist.
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Vec<Product>>> {
    let products = CategoryRepository::new(state.pool())
        .list_products(id)
        .await?;
    Ok(Json(products))
}

/// Create a category.
#[instrument(skip(admin, state, input))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = CategoryRepository::new(state.pool()).create(&input).await?;
    tracing::info!(admin_id = %admin.user_id, category_id = %category.id, "Admin created category");
    Ok((StatusCode::CREATED, Json(category)))
}

/// Replace a category. The body's id must match the path id.
#[instrument(skip(admin, state, category))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(category): Json<Category>,
) -> Result<StatusCode> {
    CategoryRepository::new(state.pool())
        .update(id, &category)
        .await?;
    tracing::info!(admin_id = %admin.user_id, category_id = %id, "Admin updated category");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a category.
#[instrument(skip(admin, state))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    CategoryRepository::new(state.pool()).delete(id).await?;
    tracing::info!(admin_id = %admin.user_id, category_id = %id, "Admin deleted category");
    Ok(StatusCode::NO_CONTENT)
}
