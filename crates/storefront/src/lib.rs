//! EasyShop storefront library.
//!
//! Catalog and shopping cart service. The binary in `main.rs` wires the
//! router from [`routes::app`] to a Postgres pool; the CLI and the
//! integration tests reuse the repositories and migrations from here.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
