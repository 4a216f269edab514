//! Resource caching.
//!
//! Product and category listings are cached in persistent `Storage` with a
//! time-to-live. An in-process Moka layer keeps the decoded form of each
//! listing so repeated fresh reads neither re-parse nor re-allocate.
//!
//! ## Architecture
//!
//! - `ResourceCache` - TTL cache of one resource collection
//! - `CachedCollection` - a listing plus the time it was fetched
//! - `CacheRegistry` - owns the decoded layers, one registry per storefront
//! - `TypedCache` - typed handle over a Moka cache
//!
//! ## Usage
//!
//! ```ignore
//! let products = ResourceCache::<Product>::new(
//!     &registry,
//!     CacheConfig::products(),
//!     storage.clone(),
//!     api.clone(),
//!     clock.clone(),
//! )?;
//!
//! let listing = products.read().await?;
//! products.invalidate(); // after a create/update/delete
//! ```

mod collection;
mod config;
mod registry;
mod typed;

pub use collection::{CachedCollection, Resource, ResourceCache, ResourceSource};
pub use config::CacheConfig;
pub use registry::CacheRegistry;
pub use typed::TypedCache;
