//! Route guards consulted before entering a protected view.
//!
//! SYSTEM CONTEXT
//! ==============
//! Guards are stateless: every check re-derives its answer from the current
//! session snapshot. A denied unauthenticated visit records the requested
//! path under `redirectUrl` so the login flow can send the user back there.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::net::types::UserRole;
use crate::state::session::{SessionSnapshot, SessionStore};
use crate::util::storage::{KeyValueStorage, REDIRECT_URL_KEY};

pub const LOGIN_PATH: &str = "/login";
/// Landing view for authenticated users.
pub const DEFAULT_AUTHENTICATED_PATH: &str = "/dashboard";

/// Outcome of a guard check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Deny and navigate to the contained path instead.
    Redirect(&'static str),
}

impl GuardDecision {
    #[must_use]
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    #[must_use]
    pub fn redirect_target(self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::Redirect(path) => Some(path),
        }
    }
}

/// Which rule a protected route enforces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RouteGuard {
    /// Any logged-in user.
    #[default]
    Authenticated,
    /// Logged-in users with the admin role.
    Admin,
}

impl RouteGuard {
    /// Check `requested_path` against the store's current snapshot.
    pub fn check(self, session: &SessionStore, requested_path: &str) -> GuardDecision {
        self.decide(&session.snapshot(), &**session.storage(), requested_path)
    }

    /// Pure decision over an explicit snapshot; writes only on an
    /// unauthenticated denial.
    pub fn decide(self, snapshot: &SessionSnapshot, storage: &dyn KeyValueStorage, requested_path: &str) -> GuardDecision {
        let Some(user) = snapshot.user.as_ref() else {
            storage.set(REDIRECT_URL_KEY, requested_path);
            log::debug!("guard denied {requested_path}: not authenticated");
            return GuardDecision::Redirect(LOGIN_PATH);
        };
        match self {
            Self::Authenticated => GuardDecision::Allow,
            Self::Admin if user.role == UserRole::Admin => GuardDecision::Allow,
            Self::Admin => {
                log::debug!("guard denied {requested_path}: role {} is not admin", user.role);
                GuardDecision::Redirect(DEFAULT_AUTHENTICATED_PATH)
            }
        }
    }
}

/// Guard for views requiring any logged-in user.
pub fn auth_guard(session: &SessionStore, requested_path: &str) -> GuardDecision {
    RouteGuard::Authenticated.check(session, requested_path)
}

/// Guard for admin-only views.
pub fn admin_guard(session: &SessionStore, requested_path: &str) -> GuardDecision {
    RouteGuard::Admin.check(session, requested_path)
}

/// Rebuild the full in-app URL for recording: path, query and fragment.
/// `search` may come with or without its leading `?`, `hash` with or
/// without its `#`.
#[must_use]
pub fn requested_url(pathname: &str, search: &str, hash: &str) -> String {
    let search = search.trim_start_matches('?');
    let hash = hash.trim_start_matches('#');
    let mut url = pathname.to_owned();
    if !search.is_empty() {
        url.push('?');
        url.push_str(search);
    }
    if !hash.is_empty() {
        url.push('#');
        url.push_str(hash);
    }
    url
}

/// Consume the path recorded by a denied guard, defaulting to the
/// dashboard. The stored value is removed so it is used at most once.
pub fn take_redirect_url(storage: &dyn KeyValueStorage) -> String {
    let target = storage
        .get(REDIRECT_URL_KEY)
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| DEFAULT_AUTHENTICATED_PATH.to_owned());
    storage.remove(REDIRECT_URL_KEY);
    target
}
