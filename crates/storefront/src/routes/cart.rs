//! Cart route handlers.
//!
//! Every cart route acts on the authenticated user's own cart and returns
//! the cart as freshly read from the store, never a cached copy.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use easyshop_core::ProductId;

use crate::db::CartRepository;
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::{Product, ShoppingCart};
use crate::state::AppState;

/// Show the user's cart.
#[instrument(skip(actor, state), fields(user_id = %actor.user_id))]
pub async fn show(
    RequireUser(actor): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<ShoppingCart>> {
    let cart = CartRepository::new(state.pool()).get(actor.user_id).await?;
    Ok(Json(cart))
}

/// Add one unit of a product.
#[instrument(skip(actor, state), fields(user_id = %actor.user_id))]
pub async fn add(
    RequireUser(actor): RequireUser,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<(StatusCode, Json<ShoppingCart>)> {
    let cart = CartRepository::new(state.pool())
        .add_item(actor.user_id, product_id)
        .await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

/// Swap the line for `product_id` to the product in the body, keeping its quantity.
#[instrument(skip(actor, state, replacement), fields(user_id = %actor.user_id))]
pub async fn update(
    RequireUser(actor): RequireUser,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Json(replacement): Json<Product>,
) -> Result<StatusCode> {
    CartRepository::new(state.pool())
        .update_item(actor.user_id, product_id, &replacement)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove one unit of a product.
#[instrument(skip(actor, state), fields(user_id = %actor.user_id))]
pub async fn remove(
    RequireUser(actor): RequireUser,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ShoppingCart>> {
    let cart = CartRepository::new(state.pool())
        .remove_item(actor.user_id, product_id)
        .await?;
    Ok(Json(cart))
}

/// Remove every line from the cart.
#[instrument(skip(actor, state), fields(user_id = %actor.user_id))]
pub async fn empty(
    RequireUser(actor): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<ShoppingCart>> {
    let cart = CartRepository::new(state.pool()).empty(actor.user_id).await?;
    Ok(Json(cart))
}
