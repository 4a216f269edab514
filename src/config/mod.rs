//! Configuration module for the storefront client.
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::HttpClientConfig;
use crate::cache::CacheConfig;
use crate::error::{Error, Result};
use crate::session::SessionConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, e.g. `http://localhost:3000/api`.
    pub api_url: String,

    /// Directory for persisted storage. In-memory storage when unset.
    pub storage_dir: Option<PathBuf>,

    pub products_cache: CacheConfig,
    pub categories_cache: CacheConfig,
    pub session: SessionConfig,
    pub http: HttpClientConfig,
}

impl Config {
    /// Build a configuration with defaults for everything but the URL.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            storage_dir: None,
            products_cache: CacheConfig::products(),
            categories_cache: CacheConfig::categories(),
            session: SessionConfig::default(),
            http: HttpClientConfig::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `API_URL` is required. Everything else falls back to defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("API_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Config("API_URL must be set".into()))?;

        let mut config = Self::new(api_url);

        config.storage_dir = lookup("SHOPFRONT_STORAGE_DIR")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        if let Some(secs) = parse_u64(&lookup, "PRODUCTS_CACHE_TTL_SECS")? {
            config.products_cache = config.products_cache.ttl(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_u64(&lookup, "CATEGORIES_CACHE_TTL_SECS")? {
            config.categories_cache = config.categories_cache.ttl(Duration::from_secs(secs));
        }
        if let Some(ms) = parse_u64(&lookup, "SESSION_DEBOUNCE_MS")? {
            config.session = SessionConfig::with_debounce(Duration::from_millis(ms));
        }
        if let Some(secs) = parse_u64(&lookup, "HTTP_TIMEOUT_SECS")? {
            config.http.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_u64<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{key} must be a non-negative integer, got {raw:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("API_URL", "http://localhost:3000/api")])).unwrap();
        assert_eq!(config.api_url, "http://localhost:3000/api");
        assert_eq!(config.storage_dir, None);
        assert_eq!(config.products_cache.ttl, Duration::from_secs(600));
        assert_eq!(config.categories_cache.ttl, Duration::from_secs(600));
        assert_eq!(config.session.debounce, Duration::from_secs(2));
        assert_eq!(config.http.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("API_URL", " http://shop.test/api "),
            ("SHOPFRONT_STORAGE_DIR", "/tmp/shopfront"),
            ("PRODUCTS_CACHE_TTL_SECS", "3600"),
            ("SESSION_DEBOUNCE_MS", "500"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://shop.test/api");
        assert_eq!(config.storage_dir, Some(PathBuf::from("/tmp/shopfront")));
        assert_eq!(config.products_cache.ttl, Duration::from_secs(3600));
        assert_eq!(config.categories_cache.ttl, Duration::from_secs(600));
        assert_eq!(config.session.debounce, Duration::from_millis(500));
    }

    #[test]
    fn test_missing_url_is_an_error() {
        assert!(matches!(
            Config::from_lookup(lookup(&[])),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_bad_number_is_an_error() {
        let result = Config::from_lookup(lookup(&[
            ("API_URL", "http://shop.test"),
            ("HTTP_TIMEOUT_SECS", "soon"),
        ]));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
