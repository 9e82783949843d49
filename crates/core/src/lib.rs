//! EasyShop Core - Shared types and consistency rules.
//!
//! This crate provides the pieces shared by every EasyShop component:
//! - `storefront` - Catalog and cart HTTP service backed by `PostgreSQL`
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. The cart/catalog invariants live here so every store
//! applies them identically and they can be tested without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and user roles
//! - [`rules`] - Merge-on-add, decrement-before-delete, id-match and row-count checks

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod rules;
pub mod types;

pub use rules::{LineChange, RuleViolation};
pub use types::*;
