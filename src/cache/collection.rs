//! Persisted collection cache for list-style resources.
//!
//! A `ResourceCache<T>` keeps the last full listing of one resource type in
//! `Storage` as `{ "timestamp": <ms>, "<resource name>": [...] }`. Reads are
//! served from storage while the listing is younger than the TTL and go to
//! the `ResourceSource` otherwise. Mutations elsewhere must call
//! `invalidate` so the next read re-fetches.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{CacheConfig, CacheRegistry, TypedCache};
use crate::clock::{Clock, duration_millis};
use crate::error::{Error, Result};
use crate::storage::Storage;

/// An entity that can be cached as part of a collection.
pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name, used as the payload field and in the storage key.
    const NAME: &'static str;

    /// Backend-assigned unique id.
    fn id(&self) -> i64;
}

/// Where a `ResourceCache` goes on a miss.
#[async_trait]
pub trait ResourceSource<T: Resource>: Send + Sync {
    /// Fetch the complete collection.
    async fn fetch_all(&self) -> Result<Vec<T>>;

    /// Fetch a single entity by id.
    async fn fetch_one(&self, id: i64) -> Result<T>;
}

/// A complete listing together with the time it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedCollection<T> {
    /// Milliseconds since epoch when the listing was fetched.
    pub captured_at: i64,
    pub items: Vec<T>,
}

impl<T: Resource> CachedCollection<T> {
    pub fn new(captured_at: i64, items: Vec<T>) -> Self {
        Self { captured_at, items }
    }

    pub fn find(&self, id: i64) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Replace the entry with the same id, or append.
    /// `captured_at` is left untouched.
    pub fn upsert(&mut self, item: T) {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => *slot = item,
            None => self.items.push(item),
        }
    }

    /// Encode to the persisted layout.
    pub fn encode(&self) -> Result<String> {
        let mut object = Map::new();
        object.insert("timestamp".to_string(), Value::from(self.captured_at));
        object.insert(T::NAME.to_string(), serde_json::to_value(&self.items)?);
        Ok(serde_json::to_string(&Value::Object(object))?)
    }

    /// Decode and shape-check a persisted payload.
    ///
    /// The timestamp must be a number, the collection field an array of
    /// objects, and every object must deserialize as `T`.
    pub fn decode(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        let Value::Object(mut object) = value else {
            return Err(Error::MalformedCache("payload is not an object".into()));
        };

        let captured_at = match object.get("timestamp") {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .ok_or_else(|| Error::MalformedCache("timestamp out of range".into()))?,
            _ => return Err(Error::MalformedCache("timestamp is not a number".into())),
        };

        let items = match object.remove(T::NAME) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(Error::MalformedCache(format!(
                    "'{}' is not an array",
                    T::NAME
                )));
            }
        };
        if items.iter().any(|item| !item.is_object()) {
            return Err(Error::MalformedCache(format!(
                "'{}' contains a non-object entry",
                T::NAME
            )));
        }

        let items = serde_json::from_value(Value::Array(items))?;
        Ok(Self { captured_at, items })
    }
}

/// Decoded payload paired with the exact text it came from.
#[derive(Clone)]
struct Decoded<T> {
    raw: Arc<str>,
    collection: Arc<CachedCollection<T>>,
}

/// TTL cache of one resource collection, persisted in `Storage`.
pub struct ResourceCache<T: Resource> {
    key: String,
    config: CacheConfig,
    storage: Arc<dyn Storage>,
    source: Arc<dyn ResourceSource<T>>,
    clock: Arc<dyn Clock>,
    decoded: TypedCache<String, Decoded<T>>,
}

impl<T: Resource> ResourceCache<T> {
    /// Build the cache for `T`, registering its decoded layer in `registry`.
    pub fn new(
        registry: &CacheRegistry,
        config: CacheConfig,
        storage: Arc<dyn Storage>,
        source: Arc<dyn ResourceSource<T>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let key = Self::storage_key();
        let decoded = registry.get_or_create(&key, config.max_capacity)?;
        Ok(Self {
            key,
            config,
            storage,
            source,
            clock,
            decoded,
        })
    }

    /// Storage key for this resource type, e.g. `cached_products`.
    pub fn storage_key() -> String {
        format!("cached_{}", T::NAME)
    }

    /// Return the cached collection while fresh, else fetch and replace it.
    ///
    /// Fetch failures propagate. There is no stale fallback.
    pub async fn read(&self) -> Result<Arc<CachedCollection<T>>> {
        if let Some(collection) = self.load_fresh() {
            debug!("Cache hit for {}", T::NAME);
            return Ok(collection);
        }

        debug!("Cache miss for {}, fetching", T::NAME);
        self.refresh().await
    }

    /// Fetch the full collection regardless of cache state and store it.
    pub async fn refresh(&self) -> Result<Arc<CachedCollection<T>>> {
        let items = self.source.fetch_all().await.inspect_err(|e| {
            warn!("Failed to fetch {}: {}", T::NAME, e);
        })?;
        let collection = CachedCollection::new(self.clock.now_millis(), items);
        Ok(self.store(collection))
    }

    /// Look up one entity, preferring the cached collection.
    ///
    /// On a miss the entity is fetched alone and upserted into the cached
    /// collection (if one is present) without resetting its timestamp.
    /// A failed fetch is logged and reported as absent.
    pub async fn read_one(&self, id: i64) -> Result<Option<T>> {
        let cached = self.load_fresh();
        if let Some(item) = cached.as_ref().and_then(|c| c.find(id)) {
            debug!("Cache hit for {} #{}", T::NAME, id);
            return Ok(Some(item.clone()));
        }

        let item = match self.source.fetch_one(id).await {
            Ok(item) => item,
            Err(e) => {
                warn!("Failed to fetch {} #{}: {}", T::NAME, id, e);
                return Ok(None);
            }
        };

        if let Some(cached) = cached {
            let mut updated = CachedCollection::clone(&cached);
            updated.upsert(item.clone());
            self.store(updated);
        }

        Ok(Some(item))
    }

    /// Discard the cached collection so the next `read` fetches.
    pub fn invalidate(&self) {
        debug!("Invalidating {} cache", T::NAME);
        self.discard();
    }

    /// Cached collection if present and well-formed, regardless of age.
    pub fn peek(&self) -> Option<Arc<CachedCollection<T>>> {
        self.load()
    }

    fn is_fresh(&self, collection: &CachedCollection<T>) -> bool {
        self.clock.now_millis() - collection.captured_at < duration_millis(self.config.ttl)
    }

    fn load_fresh(&self) -> Option<Arc<CachedCollection<T>>> {
        let collection = self.load()?;
        if self.is_fresh(&collection) {
            Some(collection)
        } else {
            debug!("Cached {} expired", T::NAME);
            self.discard();
            None
        }
    }

    fn load(&self) -> Option<Arc<CachedCollection<T>>> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Error reading {} from storage: {}", self.key, e);
                return None;
            }
        };

        if let Some(decoded) = self.decoded.get(&self.key)
            && *decoded.raw == *raw
        {
            return Some(decoded.collection);
        }

        match CachedCollection::<T>::decode(&raw) {
            Ok(collection) => {
                let collection = Arc::new(collection);
                self.decoded.insert(
                    self.key.clone(),
                    Decoded {
                        raw: raw.into(),
                        collection: Arc::clone(&collection),
                    },
                );
                Some(collection)
            }
            Err(e) => {
                warn!("Discarding malformed {} cache: {}", T::NAME, e);
                self.discard();
                None
            }
        }
    }

    fn store(&self, collection: CachedCollection<T>) -> Arc<CachedCollection<T>> {
        let collection = Arc::new(collection);
        match collection.encode() {
            Ok(raw) => {
                if let Err(e) = self.storage.set_item(&self.key, &raw) {
                    warn!("Error writing {} to storage: {}", self.key, e);
                }
                self.decoded.insert(
                    self.key.clone(),
                    Decoded {
                        raw: raw.into(),
                        collection: Arc::clone(&collection),
                    },
                );
            }
            Err(e) => warn!("Error encoding {} cache: {}", T::NAME, e),
        }
        collection
    }

    fn discard(&self) {
        self.decoded.invalidate(&self.key);
        if let Err(e) = self.storage.remove_item(&self.key) {
            warn!("Error removing {} from storage: {}", self.key, e);
        }
    }
}

impl<T: Resource> std::fmt::Debug for ResourceCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("key", &self.key)
            .field("config", &self.config)
            .finish()
    }
}
