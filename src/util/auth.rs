//! Route guard for protected views.
//!
//! SYSTEM CONTEXT
//! ==============
//! The navigation layer asks [`RouteGuard`] before entering any protected
//! view. Unauthenticated users are sent to `/login?redirect=<path>` and the
//! login view later resolves [`post_login_destination`] from that parameter.
//! The check is synchronous and reads only resident state.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::fmt;
use std::sync::Arc;

use crate::context::ExecutionContext;

pub const LOGIN_ROUTE: &str = "/login";
pub const RETURN_TO_PARAM: &str = "redirect";
pub const DEFAULT_AFTER_LOGIN: &str = "/notes";

/// Cheap authentication query consulted by the guard.
pub trait AuthStatus: Send + Sync {
    fn is_authenticated(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Entry denied; navigate to `to`, remembering `return_to`.
    Redirect { to: String, return_to: String },
}

impl GuardDecision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Full redirect target, e.g. `/login?redirect=%2Fnotes%2F4`.
    #[must_use]
    pub fn redirect_url(&self) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::Redirect { to, return_to } => {
                Some(format!("{to}?{RETURN_TO_PARAM}={}", urlencoding::encode(return_to)))
            }
        }
    }
}

#[derive(Clone)]
pub struct RouteGuard {
    context: ExecutionContext,
    auth: Arc<dyn AuthStatus>,
}

impl RouteGuard {
    #[must_use]
    pub fn new(context: ExecutionContext, auth: Arc<dyn AuthStatus>) -> Self {
        Self { context, auth }
    }

    /// Decide whether `requested_path` may be entered.
    ///
    /// Outside the interactive context the return path is empty, since the
    /// requested location cannot be observed there.
    #[must_use]
    pub fn check(&self, requested_path: &str) -> GuardDecision {
        if self.auth.is_authenticated() {
            return GuardDecision::Allow;
        }
        let return_to = if self.context.can_observe_navigation() { requested_path.to_owned() } else { String::new() };
        GuardDecision::Redirect { to: LOGIN_ROUTE.to_owned(), return_to }
    }

    /// Run [`RouteGuard::check`] and hand any redirect URL to `navigate`.
    /// Returns whether entry is allowed.
    pub fn enforce<F>(&self, requested_path: &str, navigate: F) -> bool
    where
        F: FnOnce(&str),
    {
        let decision = self.check(requested_path);
        if let Some(url) = decision.redirect_url() {
            navigate(&url);
        }
        decision.is_allowed()
    }
}

impl fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteGuard")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// Pull the return path out of a login-view query string (`a=1&redirect=...`).
#[must_use]
pub fn return_to_from_query(query: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == RETURN_TO_PARAM)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
}

/// Where to go after a successful login: the remembered path, else `/notes`.
#[must_use]
pub fn post_login_destination(return_to: Option<&str>) -> String {
    return_to
        .filter(|path| !path.is_empty())
        .unwrap_or(DEFAULT_AFTER_LOGIN)
        .to_owned()
}
