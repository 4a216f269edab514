//! Shopfront - storefront client library
//!
//! Client-side state for a storefront REST backend: persisted TTL caches of
//! the product catalogue, a debounced session store, and a persisted cart.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `storage` - Key-value persistence (in-memory or files)
//! - `cache` - Persisted resource caches with a Moka decoded layer
//! - `session` - Authenticated identity and its verification
//! - `cart` - Shopping cart
//! - `api` - HTTP client for the backend
//! - `storefront` - Everything above wired together

pub mod api;
pub mod cache;
pub mod cart;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;
pub mod storefront;

pub use config::Config;
pub use error::{Error, Result};
pub use storefront::Storefront;
