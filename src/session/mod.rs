//! Session state: who is logged in.
//!
//! The `SessionStore` holds the authenticated identity in memory and
//! re-validates it against the backend. Re-validation is debounced so
//! several callers asking at once produce a single `/auth/verify` call.
//!
//! ## Ordering
//!
//! Each verification takes a sequence number when it starts. A response is
//! applied only if no later verification, login or logout has been applied
//! already, so a slow response can never overwrite newer state.
//!
//! ## Usage
//!
//! ```ignore
//! let session = SessionStore::new(api.clone(), clock.clone(), SessionConfig::default());
//!
//! session.login_with_credentials(&Credentials::new(email, password)).await?;
//! if session.has_role(&[Role::Administrator]) {
//!     // ...
//! }
//! session.logout().await;
//! ```

mod store;

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Credentials, SessionIdentity};

pub use store::SessionStore;

/// Body of `GET /auth/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub authenticated: bool,

    #[serde(default)]
    pub user: Option<SessionIdentity>,
}

/// Backend operations the session store depends on.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn verify(&self) -> Result<VerifyResponse>;

    async fn login(&self, credentials: &Credentials) -> Result<SessionIdentity>;

    async fn logout(&self) -> Result<()>;
}

/// Session store configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Minimum interval between two unforced verifications.
    pub debounce: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_secs(2),
        }
    }
}

impl SessionConfig {
    pub fn with_debounce(debounce: Duration) -> Self {
        Self { debounce }
    }
}
