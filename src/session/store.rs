//! In-memory session store with debounced, sequenced verification.

use std::future::{Future, pending};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use super::{AuthBackend, SessionConfig, VerifyResponse};
use crate::clock::{Clock, duration_millis};
use crate::error::{Error, Result};
use crate::models::{Credentials, Role, SessionIdentity};

#[derive(Debug, Default)]
struct State {
    identity: Option<SessionIdentity>,
    /// Set only when a verification response is applied.
    last_verified_at: Option<i64>,
    /// Sequence number of the last applied update.
    applied_seq: u64,
}

/// Holds the current identity and keeps it in sync with the backend.
pub struct SessionStore {
    backend: Arc<dyn AuthBackend>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    state: RwLock<State>,
    next_seq: AtomicU64,
    /// Held by the unforced verification currently on the network.
    in_flight: Mutex<()>,
    changes: watch::Sender<Option<SessionIdentity>>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn AuthBackend>, clock: Arc<dyn Clock>, config: SessionConfig) -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            backend,
            clock,
            config,
            state: RwLock::new(State::default()),
            next_seq: AtomicU64::new(0),
            in_flight: Mutex::new(()),
            changes,
        }
    }

    /// The identity currently held, without touching the network.
    pub fn current(&self) -> Option<SessionIdentity> {
        self.state.read().identity.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().identity.is_some()
    }

    /// Whether the current identity holds one of `allowed`.
    pub fn has_role(&self, allowed: &[Role]) -> bool {
        self.state
            .read()
            .identity
            .as_ref()
            .is_some_and(|identity| allowed.contains(&identity.role))
    }

    pub fn last_verified_at(&self) -> Option<i64> {
        self.state.read().last_verified_at
    }

    /// Receiver notified whenever the identity changes value.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionIdentity>> {
        self.changes.subscribe()
    }

    /// Re-validate the session against the backend.
    ///
    /// Unforced calls inside the debounce window return the held identity,
    /// and unforced calls made while another unforced call is in flight wait
    /// for its result instead of issuing their own request.
    /// Any failure reads as "not authenticated".
    pub async fn verify(&self, force: bool) -> Option<SessionIdentity> {
        self.verify_with(force, pending()).await
    }

    /// `verify`, abandoning the request if `cancel` completes first.
    ///
    /// A cancelled verification leaves the state untouched.
    pub async fn verify_with<C>(&self, force: bool, cancel: C) -> Option<SessionIdentity>
    where
        C: Future<Output = ()>,
    {
        if !force && let Some(identity) = self.recently_verified() {
            debug!("Session verified recently, skipping");
            return identity;
        }

        tokio::select! {
            biased;
            () = cancel => {
                debug!("Session verification cancelled");
                self.current()
            }
            identity = self.fetch(force) => identity,
        }
    }

    async fn fetch(&self, force: bool) -> Option<SessionIdentity> {
        // Unforced callers queue here; whoever gets in after a response has
        // landed reuses it.
        let _in_flight = if force {
            None
        } else {
            let guard = self.in_flight.lock().await;
            if let Some(identity) = self.recently_verified() {
                debug!("Session verified while waiting, reusing result");
                return identity;
            }
            Some(guard)
        };

        let seq = self.next_seq();
        let identity = match self.backend.verify().await {
            Ok(VerifyResponse {
                authenticated: true,
                user: Some(user),
            }) => Some(user),
            Ok(_) => {
                debug!("Backend reports no authenticated session");
                None
            }
            Err(e) => {
                warn!("Session verification #{} failed: {}", seq, e);
                None
            }
        };

        self.apply(seq, identity, true)
    }

    /// The held identity if the last verification is inside the debounce window.
    fn recently_verified(&self) -> Option<Option<SessionIdentity>> {
        let state = self.state.read();
        let at = state.last_verified_at?;
        (self.clock.now_millis() - at < duration_millis(self.config.debounce))
            .then(|| state.identity.clone())
    }

    /// Adopt `identity` immediately, then reconcile with the backend.
    pub async fn login(&self, identity: SessionIdentity) -> Option<SessionIdentity> {
        info!("Session opened for {} ({})", identity.email, identity.role);
        let seq = self.next_seq();
        self.apply(seq, Some(identity), false);
        self.verify(true).await
    }

    /// Log in with email and password.
    ///
    /// Returns the identity after reconciliation. Rejected credentials
    /// surface as the backend's error.
    pub async fn login_with_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<SessionIdentity> {
        let identity = self.backend.login(credentials).await?;
        self.login(identity).await.ok_or(Error::NotAuthenticated)
    }

    /// Close the session. The local identity is cleared even when the
    /// backend call fails.
    pub async fn logout(&self) {
        if let Err(e) = self.backend.logout().await {
            warn!("Backend logout failed, clearing session anyway: {}", e);
        }
        let seq = self.next_seq();
        self.apply(seq, None, false);
        info!("Session closed");
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn apply(
        &self,
        seq: u64,
        identity: Option<SessionIdentity>,
        verified: bool,
    ) -> Option<SessionIdentity> {
        let mut state = self.state.write();
        if seq <= state.applied_seq {
            debug!(
                "Ignoring stale session update #{} (applied #{})",
                seq, state.applied_seq
            );
            return state.identity.clone();
        }

        state.applied_seq = seq;
        if verified {
            state.last_verified_at = Some(self.clock.now_millis());
        }
        if state.identity != identity {
            state.identity.clone_from(&identity);
            self.changes.send_replace(identity);
        }
        state.identity.clone()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("SessionStore")
            .field("identity", &state.identity)
            .field("last_verified_at", &state.last_verified_at)
            .field("config", &self.config)
            .finish()
    }
}
