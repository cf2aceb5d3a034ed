//! Session store: the single source of truth for who is logged in.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `SessionStore` is created at startup and handed to the app through
//! context. Route guards read its snapshot; the header and pages observe
//! it through `subscribe`. Nothing outside this module can mutate the
//! session.
//!
//! DESIGN
//! ======
//! The store is a cheap `Rc` handle over a `RefCell`. The client runs on a
//! single cooperative thread, so no borrow is ever held across an `.await`:
//! `login` only touches the cell after the auth call has resolved, which
//! keeps a failed or still-pending login from disturbing the current state.
//!
//! Observers run synchronously, in subscription order, after each
//! transition. The observer list is cloned before dispatch so a callback may
//! read the store, subscribe, or unsubscribe without re-entrancy panics.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::config::ClientConfig;
use crate::error::AuthError;
use crate::net::api::{AuthApi, HttpAuthApi};
use crate::net::types::{LoginRequest, ProfileUpdate, RegisterRequest, User, UserRole};
use crate::util::storage::{self, AUTH_TOKEN_KEY, KeyValueStorage, SharedStorage, USER_DATA_KEY};

/// Built-in demo account, accepted without a server round trip.
pub const DEMO_EMAIL: &str = "demo@learnmate.com";
pub const DEMO_PASSWORD: &str = "demo123";
pub const DEMO_TOKEN: &str = "mock-token-123";

/// The user synthesized for a demo login.
#[must_use]
pub fn demo_user() -> User {
    User {
        id: "1".to_owned(),
        email: DEMO_EMAIL.to_owned(),
        first_name: "Demo".to_owned(),
        last_name: "User".to_owned(),
        role: UserRole::Student,
        avatar: None,
        enrolled_courses: Vec::new(),
        progress: HashMap::new(),
        created_at: None,
        updated_at: None,
        last_login: None,
        is_active: None,
        preferences: None,
    }
}

/// Immutable read of the session at one point in time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
}

impl SessionSnapshot {
    /// Always equal to `user.is_some()`.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn role(&self) -> Option<UserRole> {
        self.user.as_ref().map(|u| u.role)
    }
}

/// Handle returned by [`SessionStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Rc<dyn Fn(&SessionSnapshot)>;

#[derive(Default)]
struct Inner {
    user: Option<User>,
    token: Option<String>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

/// Client-side session state with persistence and change notification.
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<RefCell<Inner>>,
    storage: SharedStorage,
    api: Rc<dyn AuthApi>,
    demo_login_enabled: bool,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("SessionStore")
            .field("user", &inner.user)
            .field("has_token", &inner.token.is_some())
            .field("observers", &inner.observers.len())
            .field("persistent", &self.storage.is_persistent())
            .field("demo_login_enabled", &self.demo_login_enabled)
            .finish()
    }
}

impl SessionStore {
    /// Empty, unauthenticated store. Demo login is enabled.
    #[must_use]
    pub fn new(storage: SharedStorage, api: Rc<dyn AuthApi>) -> Self {
        Self { inner: Rc::new(RefCell::new(Inner::default())), storage, api, demo_login_enabled: true }
    }

    /// Store wired to the detected storage backend and the HTTP auth API.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(storage::detect(), Rc::new(HttpAuthApi::new(config)))
            .with_demo_login(config.demo_login_enabled)
    }

    #[must_use]
    pub fn with_demo_login(mut self, enabled: bool) -> Self {
        self.demo_login_enabled = enabled;
        self
    }

    /// Storage handle shared with the route guards.
    #[must_use]
    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    // =========================================================================
    // SNAPSHOTS
    // =========================================================================

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot { user: self.inner.borrow().user.clone() }
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.inner.borrow().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.borrow().user.is_some()
    }

    /// Session token, if logged in.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.borrow().token.clone()
    }

    // =========================================================================
    // OBSERVERS
    // =========================================================================

    /// Register `observer`. It is called once immediately with the current
    /// snapshot, then after every transition until unsubscribed.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&SessionSnapshot) + 'static,
    {
        let observer: Observer = Rc::new(observer);
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = SubscriptionId(inner.next_subscription);
            inner.next_subscription += 1;
            inner.observers.push((id, Rc::clone(&observer)));
            id
        };
        observer(&self.snapshot());
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.observers.len();
        inner.observers.retain(|(sid, _)| *sid != id);
        inner.observers.len() != before
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        let observers: Vec<Observer> = self.inner.borrow().observers.iter().map(|(_, o)| Rc::clone(o)).collect();
        for observer in observers {
            observer(&snapshot);
        }
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Load a persisted session. Returns `true` if one was restored.
    ///
    /// Unreadable data is cleared and treated as no session; missing storage
    /// is skipped silently.
    pub fn restore(&self) -> bool {
        match self.try_restore() {
            Ok(restored) => restored,
            Err(AuthError::PersistenceUnavailable) => false,
            Err(e) => {
                log::warn!("discarding persisted session: {e}");
                self.clear_persisted();
                false
            }
        }
    }

    /// Like [`restore`](Self::restore) but reports why nothing was restored.
    ///
    /// # Errors
    ///
    /// `PersistenceUnavailable` when storage is a no-op, `PersistenceRead`
    /// when the stored user record does not parse. Neither clears storage.
    pub fn try_restore(&self) -> Result<bool, AuthError> {
        if !self.storage.is_persistent() {
            return Err(AuthError::PersistenceUnavailable);
        }
        let (Some(token), Some(raw_user)) = (self.storage.get(AUTH_TOKEN_KEY), self.storage.get(USER_DATA_KEY)) else {
            return Ok(false);
        };
        let user: User = serde_json::from_str(&raw_user).map_err(|e| AuthError::PersistenceRead(e.to_string()))?;
        log::info!("restored session for user {} ({})", user.id, user.role);
        self.apply(token, user);
        Ok(true)
    }

    /// Log in, returning whether it succeeded. Failure leaves state untouched.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        match self.try_login(email, password).await {
            Ok(_) => true,
            Err(e) => {
                log::warn!("login failed: {e}");
                false
            }
        }
    }

    /// Log in and return the new user.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` or `Transport` from the auth API.
    pub async fn try_login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if self.demo_login_enabled && email == DEMO_EMAIL && password == DEMO_PASSWORD {
            let user = demo_user();
            self.set_auth_data(DEMO_TOKEN.to_owned(), user.clone());
            return Ok(user);
        }
        let request = LoginRequest { email: email.to_owned(), password: password.to_owned() };
        let response = self.api.login(&request).await?;
        self.set_auth_data(response.token, response.user.clone());
        Ok(response.user)
    }

    /// Create an account and log in as it.
    pub async fn register(&self, request: &RegisterRequest) -> bool {
        match self.try_register(request).await {
            Ok(_) => true,
            Err(e) => {
                log::warn!("registration failed: {e}");
                false
            }
        }
    }

    /// # Errors
    ///
    /// Any error from the auth API; state is unchanged on error.
    pub async fn try_register(&self, request: &RegisterRequest) -> Result<User, AuthError> {
        let response = self.api.register(request).await?;
        self.set_auth_data(response.token, response.user.clone());
        Ok(response.user)
    }

    /// Ask the server to send a password reset email. Never touches state.
    pub async fn reset_password(&self, email: &str) -> bool {
        match self.api.reset_password(email).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("password reset failed: {e}");
                false
            }
        }
    }

    /// Update the current user's profile on the server.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> bool {
        match self.try_update_profile(update).await {
            Ok(_) => true,
            Err(e) => {
                log::warn!("profile update failed: {e}");
                false
            }
        }
    }

    /// # Errors
    ///
    /// `NotAuthenticated` without a token (no request is sent) or when the
    /// session changed while the request was in flight, otherwise any error
    /// from the auth API.
    pub async fn try_update_profile(&self, update: &ProfileUpdate) -> Result<User, AuthError> {
        let token = self.token().ok_or(AuthError::NotAuthenticated)?;
        let user = self.api.update_profile(&token, update).await?;
        if self.token().as_deref() != Some(token.as_str()) {
            log::debug!("dropping profile response for a session that has since ended");
            return Err(AuthError::NotAuthenticated);
        }
        self.set_auth_data(token, user.clone());
        Ok(user)
    }

    /// Clear the session and persisted credentials. Idempotent; observers
    /// are only notified when a session actually ended.
    pub fn logout(&self) {
        self.clear_persisted();
        let ended = {
            let mut inner = self.inner.borrow_mut();
            inner.token = None;
            inner.user.take().is_some()
        };
        if ended {
            log::info!("logged out");
            self.notify();
        }
    }

    fn set_auth_data(&self, token: String, user: User) {
        self.storage.set(AUTH_TOKEN_KEY, &token);
        match serde_json::to_string(&user) {
            Ok(raw) => self.storage.set(USER_DATA_KEY, &raw),
            Err(e) => log::error!("could not persist user record: {e}"),
        }
        log::info!("authenticated user {} ({})", user.id, user.role);
        self.apply(token, user);
    }

    fn apply(&self, token: String, user: User) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.token = Some(token);
            inner.user = Some(user);
        }
        self.notify();
    }

    fn clear_persisted(&self) {
        self.storage.remove(AUTH_TOKEN_KEY);
        self.storage.remove(USER_DATA_KEY);
    }
}
