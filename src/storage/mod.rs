//! Persistent key/value storage.
//!
//! The storefront keeps its cached collections and the cart in a string
//! key/value store, the same shape as browser `localStorage`:
//! - `MemoryStorage` - process-local, lost on exit
//! - `FileStorage` - one JSON file per key under a directory
//!
//! Values are opaque strings; encoding is the caller's concern.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::Result;

/// String key/value storage shared by every cache in a `Storefront`.
pub trait Storage: Send + Sync {
    /// Read the value for `key`, `None` if unset.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;
}
