//! Registry of named in-process cache layers.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::TypedCache;
use crate::error::{Error, Result};

/// Owns the decoded in-process layers of every resource cache.
///
/// One registry is created per `Storefront`, so two storefronts in the same
/// process never share decoded state.
#[derive(Clone, Default)]
pub struct CacheRegistry {
    caches: Arc<RwLock<HashMap<String, Entry>>>,
}

struct Entry {
    cache: Box<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the layer registered under `name`, creating it if missing.
    ///
    /// Fails if `name` was registered with different key/value types.
    pub fn get_or_create<K, V>(&self, name: &str, max_capacity: u64) -> Result<TypedCache<K, V>>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        if let Some(cache) = self.get(name)? {
            return Ok(cache);
        }

        let mut caches = self.caches.write();
        // Another caller may have won the race between the read and write lock.
        if let Some(existing) = caches.get(name) {
            return downcast(name, existing);
        }

        debug!("Creating cache layer: {}", name);
        let cache = TypedCache::<K, V>::new(name, max_capacity);
        caches.insert(
            name.to_string(),
            Entry {
                cache: Box::new(cache.clone()),
                type_id: TypeId::of::<TypedCache<K, V>>(),
                type_name: std::any::type_name::<TypedCache<K, V>>(),
            },
        );
        Ok(cache)
    }

    fn get<K, V>(&self, name: &str) -> Result<Option<TypedCache<K, V>>>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let caches = self.caches.read();
        caches.get(name).map(|entry| downcast(name, entry)).transpose()
    }
}

fn downcast<K, V>(name: &str, entry: &Entry) -> Result<TypedCache<K, V>>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    if entry.type_id != TypeId::of::<TypedCache<K, V>>() {
        return Err(Error::CacheTypeMismatch {
            name: name.to_string(),
            existing: entry.type_name,
        });
    }
    entry
        .cache
        .downcast_ref::<TypedCache<K, V>>()
        .cloned()
        .ok_or_else(|| Error::CacheTypeMismatch {
            name: name.to_string(),
            existing: entry.type_name,
        })
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let caches = self.caches.read();
        f.debug_struct("CacheRegistry")
            .field("cache_count", &caches.len())
            .field("cache_names", &caches.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_returns_shared_layer() {
        let registry = CacheRegistry::new();
        let a: TypedCache<String, u32> = registry.get_or_create("products", 4).unwrap();
        let b: TypedCache<String, u32> = registry.get_or_create("products", 4).unwrap();

        a.insert("k".to_string(), 7);
        assert_eq!(b.get(&"k".to_string()), Some(7));
        assert_eq!(b.name(), "products");
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let registry = CacheRegistry::new();
        let _: TypedCache<String, u32> = registry.get_or_create("products", 4).unwrap();

        let err = registry
            .get_or_create::<String, String>("products", 4)
            .unwrap_err();
        assert!(matches!(err, Error::CacheTypeMismatch { .. }));
    }
}
