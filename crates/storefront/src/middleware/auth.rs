//! Authentication extractors.
//!
//! Authentication itself happens upstream: the gateway verifies the caller
//! and forwards the identity in headers, together with a shared secret that
//! proves the request came through it. These extractors turn those headers
//! into an explicit [`Actor`] capability for handlers.
//!
//! # Headers
//!
//! - `x-gateway-secret` - must equal `STOREFRONT_GATEWAY_SECRET`
//! - `x-user-id` - numeric user ID
//! - `x-user-role` - `ROLE_USER` (default) or `ROLE_ADMIN`
//! - `x-username` - optional display name

use axum::{extract::FromRequestParts, http::request::Parts};

use easyshop_core::{Role, UserId};

use crate::error::AppError;
use crate::models::Actor;
use crate::state::AppState;

pub const GATEWAY_SECRET_HEADER: &str = "x-gateway-secret";
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const USERNAME_HEADER: &str = "x-username";

/// Extractor that requires an authenticated user of any role.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser(actor): RequireUser) -> String {
///     format!("Hello, user {}!", actor.user_id)
/// }
/// ```
pub struct RequireUser(pub Actor);

/// Extractor that requires an authenticated admin.
///
/// Rejects unauthenticated requests with 401 and non-admins with 403.
pub struct RequireAdmin(pub Actor);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let actor = actor_from_parts(parts, state)?;
        record_actor(&actor);
        Ok(Self(actor))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let actor = actor_from_parts(parts, state)?;
        record_actor(&actor);

        if !actor.is_admin() {
            tracing::warn!(user_id = %actor.user_id, "Admin route denied");
            return Err(AppError::Forbidden("admin role required".to_string()));
        }

        Ok(Self(actor))
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

/// Build the actor from gateway headers.
fn actor_from_parts(parts: &Parts, state: &AppState) -> Result<Actor, AppError> {
    let secret = header(parts, GATEWAY_SECRET_HEADER)
        .ok_or_else(|| AppError::Unauthorized("missing gateway credentials".to_string()))?;
    if !state.config().gateway_secret_matches(secret) {
        tracing::warn!("Rejected request with invalid gateway secret");
        return Err(AppError::Unauthorized(
            "invalid gateway credentials".to_string(),
        ));
    }

    let user_id = header(parts, USER_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized("missing user id".to_string()))?
        .trim()
        .parse::<i32>()
        .map(UserId::new)
        .map_err(|_| AppError::Unauthorized("invalid user id".to_string()))?;

    let role = match header(parts, USER_ROLE_HEADER) {
        Some(value) => value
            .parse::<Role>()
            .map_err(|e| AppError::Unauthorized(e.to_string()))?,
        None => Role::User,
    };

    let username = header(parts, USERNAME_HEADER).map(str::to_owned);

    Ok(Actor::new(user_id, username, role))
}

/// Attach the actor to the current span and Sentry scope.
fn record_actor(actor: &Actor) {
    tracing::Span::current().record("user_id", actor.user_id.as_i32());
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(actor.user_id.to_string()),
            username: actor.username.clone(),
            ..Default::default()
        }));
    });
}
