//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Liveness check
//! GET    /health/ready                  - Readiness check (database)
//! GET    /teapot                        - 418
//!
//! # Categories (writes require admin)
//! GET    /categories                    - List categories
//! POST   /categories                    - Create category (201)
//! GET    /categories/{id}               - Category detail
//! PUT    /categories/{id}               - Replace category (204)
//! DELETE /categories/{id}               - Delete category (204)
//! GET    /categories/{id}/products      - Products in category (404 if category absent)
//!
//! # Products (writes require admin)
//! GET    /products                      - List products
//! POST   /products                      - Create product (201)
//! GET    /products/{id}                 - Product detail
//! PUT    /products/{id}                 - Replace product (204)
//! DELETE /products/{id}                 - Delete product (204)
//!
//! # Cart (requires user)
//! GET    /cart                          - Cart view
//! DELETE /cart                          - Empty cart
//! POST   /cart/products/{product_id}    - Add one unit (201, returns cart)
//! PUT    /cart/products/{product_id}    - Swap line to body product (204)
//! DELETE /cart/products/{product_id}    - Remove one unit (returns cart)
//! ```

pub mod cart;
pub mod categories;
pub mod health;
pub mod products;

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request},
    middleware::from_fn,
    routing::get,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::{request_id::make_request_span, request_id_middleware};
use crate::state::AppState;

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/{id}/products", get(categories::products))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::empty))
        .route(
            "/products/{product_id}",
            axum::routing::post(cart::add)
                .put(cart::update)
                .delete(cart::remove),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/teapot", get(health::teapot))
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
}

/// Build the CORS layer from the configured origin.
fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let origin = match allowed_origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => AllowOrigin::exact(origin),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Invalid STOREFRONT_ALLOWED_ORIGIN, allowing any origin");
            AllowOrigin::any()
        }
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

/// Build the full application with its middleware stack.
///
/// Sentry layers are added by the binary so tests can build the app without them.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config().allowed_origin.as_deref());

    routes()
        .with_state(state)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| make_request_span(request)),
        )
        .layer(cors)
}
