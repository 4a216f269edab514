//! Library error type.

use thiserror::Error;

/// Errors produced by the storefront client.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure (connect, timeout, body decode).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persisted cache entry parsed but did not have the expected shape.
    #[error("malformed cache entry: {0}")]
    MalformedCache(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("invalid checkout: {0}")]
    InvalidCheckout(String),

    #[error("cache '{name}' already registered as {existing}")]
    CacheTypeMismatch {
        name: String,
        existing: &'static str,
    },
}

impl Error {
    /// HTTP status code, when the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
