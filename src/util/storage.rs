//! Key-value persistence behind a capability check.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionStore` and the route guards share one storage handle. Which
//! implementation backs it is decided once by [`detect`]: browser
//! `localStorage` under `hydrate`, a no-op store everywhere else (SSR,
//! native). Callers never branch on the environment themselves.
//!
//! TRADE-OFFS
//! ==========
//! Writes are best-effort. A quota or security error from `localStorage`
//! is logged and dropped rather than surfaced, matching how the UI treats
//! persistence as invisible to the user.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Persisted session token.
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Persisted user record, JSON encoded.
pub const USER_DATA_KEY: &str = "userData";
/// Path a guard denied, for redirect-back after login.
pub const REDIRECT_URL_KEY: &str = "redirectUrl";
/// Set to `"true"` when the user ticks "remember me".
pub const REMEMBER_ME_KEY: &str = "rememberMe";

/// Minimal string key-value store.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);

    /// Whether writes survive a reload. The no-op store returns `false`.
    fn is_persistent(&self) -> bool {
        true
    }
}

/// Shared handle used by the store and guards.
pub type SharedStorage = Rc<dyn KeyValueStorage>;

/// Stand-in when no persistent storage exists; reads miss, writes vanish.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopStorage;

impl KeyValueStorage for NoopStorage {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) {}

    fn remove(&self, _key: &str) {}

    fn is_persistent(&self) -> bool {
        false
    }
}

/// In-process map, used for tests and for hosts that want session state
/// without a browser.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// Browser `window.localStorage`.
#[cfg(feature = "hydrate")]
pub struct LocalStorage {
    inner: web_sys::Storage,
}

#[cfg(feature = "hydrate")]
impl LocalStorage {
    /// `None` when there is no window or storage access is denied.
    pub fn open() -> Option<Self> {
        let inner = web_sys::window().and_then(|w| w.local_storage().ok().flatten())?;
        Some(Self { inner })
    }
}

#[cfg(feature = "hydrate")]
impl KeyValueStorage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.inner.set_item(key, value) {
            log::warn!("localStorage write failed for {key}: {e:?}");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.inner.remove_item(key) {
            log::warn!("localStorage remove failed for {key}: {e:?}");
        }
    }
}

/// Pick the storage backend for this execution context.
#[must_use]
pub fn detect() -> SharedStorage {
    #[cfg(feature = "hydrate")]
    {
        if let Some(storage) = LocalStorage::open() {
            return Rc::new(storage);
        }
        log::debug!("localStorage unavailable; session will not persist");
    }
    Rc::new(NoopStorage)
}
