//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by the route guard (via [`AuthStatus`]) and by user-aware views that
//! subscribe to the current profile. Login and registration persist the
//! token before publishing the profile; logout clears both locally.
//!
//! TRADE-OFFS
//! ==========
//! `is_authenticated` only checks that a token is stored. A stored token is
//! trusted until the once-per-process [`SessionState::reconcile`] validates
//! it against the server; any failure there discards it.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use super::subject::{Subject, Subscription};
use crate::error::{GatewayFailure, NormalizedError};
use crate::net::gateway::RequestGateway;
use crate::net::types::{AuthResponse, Credentials, UserEnvelope, UserProfile};
use crate::storage::token_store::PersistentTokenStore;
use crate::util::auth::AuthStatus;

pub const REGISTER_PATH: &str = "/api/auth/register";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const PROFILE_PATH: &str = "/api/auth/profile";

/// What startup reconciliation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    /// Reconciliation already ran for this session instance.
    AlreadyRan,
    /// Not in an interactive context; storage was not consulted.
    Skipped,
    /// No stored token; nothing to validate.
    NoToken,
    /// The stored token was accepted and its profile published.
    Restored,
    /// The stored token was rejected and cleared.
    Discarded,
}

/// Shared handle; clones observe and mutate the same session.
#[derive(Clone)]
pub struct SessionState {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    gateway: RequestGateway,
    tokens: PersistentTokenStore,
    user: Subject<Option<UserProfile>>,
    reconciled: AtomicBool,
}

impl SessionState {
    /// `tokens` must be the same slot the gateway reads from.
    #[must_use]
    pub fn new(gateway: RequestGateway, tokens: PersistentTokenStore) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                gateway,
                tokens,
                user: Subject::new(None),
                reconciled: AtomicBool::new(false),
            }),
        }
    }

    /// Cheap local check: a non-empty token is stored. No network call.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.tokens.read().is_some()
    }

    /// Latest published profile.
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.inner.user.get()
    }

    /// Observe the current profile. `callback` runs immediately with the
    /// latest value and again after every change.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Option<&UserProfile>) + Send + Sync + 'static,
    {
        self.inner.user.subscribe(move |user| callback(user.as_ref()))
    }

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// Returns the gateway's [`NormalizedError`]; session state is unchanged.
    pub async fn register(&self, email: &str, password: &str) -> Result<UserProfile, NormalizedError> {
        let user = self.authenticate(REGISTER_PATH, email, password).await?;
        info!(user_id = user.id, "registered");
        Ok(user)
    }

    /// Sign in with email and password.
    ///
    /// During prerender the token cannot be stored, so the profile is returned
    /// but not published and the session stays signed out.
    ///
    /// # Errors
    ///
    /// Returns the gateway's [`NormalizedError`]; session state is unchanged.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, NormalizedError> {
        let user = self.authenticate(LOGIN_PATH, email, password).await?;
        info!(user_id = user.id, "logged in");
        Ok(user)
    }

    /// Forget the token and the profile. Local only.
    pub fn logout(&self) {
        self.inner.tokens.clear();
        self.inner.user.publish(None);
        info!("logged out");
    }

    /// Fetch the profile for the stored token. Does not publish.
    ///
    /// # Errors
    ///
    /// Returns the gateway's [`NormalizedError`].
    pub async fn profile(&self) -> Result<UserProfile, NormalizedError> {
        let envelope: UserEnvelope = self.inner.gateway.get(PROFILE_PATH).await?;
        Ok(envelope.user)
    }

    /// Validate a stored token once per session instance.
    ///
    /// On success the profile is published; on any failure the token is
    /// cleared and an absent profile is published.
    pub async fn reconcile(&self) -> Reconciliation {
        if self.inner.reconciled.swap(true, Ordering::SeqCst) {
            return Reconciliation::AlreadyRan;
        }
        if !self.inner.tokens.context().has_durable_storage() {
            return Reconciliation::Skipped;
        }
        if self.inner.tokens.read().is_none() {
            return Reconciliation::NoToken;
        }

        match self.profile().await {
            Ok(user) => {
                info!(user_id = user.id, "session restored");
                self.inner.user.publish(Some(user));
                Reconciliation::Restored
            }
            Err(e) => {
                warn!(status = ?e.status_code(), message = e.friendly_message(), "stored token rejected; clearing session");
                self.inner.tokens.clear();
                self.inner.user.publish(None);
                Reconciliation::Discarded
            }
        }
    }

    async fn authenticate(&self, path: &str, email: &str, password: &str) -> Result<UserProfile, NormalizedError> {
        let response: AuthResponse = self.inner.gateway.post(path, &Credentials { email, password }).await?;
        let (user, token) = match response {
            AuthResponse { user: Some(user), token: Some(token) } if !token.is_empty() => (user, token),
            AuthResponse { token: None, .. } | AuthResponse { user: Some(_), .. } => {
                return Err(invalid_response("authentication response did not include a token"));
            }
            AuthResponse { user: None, .. } => {
                return Err(invalid_response("authentication response did not include a user"));
            }
        };

        self.inner.tokens.write(&token);
        // A profile is only published alongside a stored token.
        if self.inner.tokens.context().has_durable_storage() {
            self.inner.user.publish(Some(user.clone()));
        }
        Ok(user)
    }
}

impl AuthStatus for SessionState {
    fn is_authenticated(&self) -> bool {
        SessionState::is_authenticated(self)
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("user", &self.inner.user)
            .field("reconciled", &self.inner.reconciled.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

fn invalid_response(reason: &str) -> NormalizedError {
    let err = NormalizedError::from_failure(GatewayFailure::InvalidResponse(reason.to_owned()));
    warn!(reason, "rejecting authentication response");
    err
}
