//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added by the binary)
//! 2. CORS
//! 3. `TraceLayer` (opens the request span)
//! 4. Request ID (fills `request_id` on that span)
//!
//! Authentication is not a layer: handlers opt in through the
//! [`RequireUser`] and [`RequireAdmin`] extractors.

pub mod auth;
pub mod request_id;

pub use auth::{RequireAdmin, RequireUser};
pub use request_id::request_id_middleware;
