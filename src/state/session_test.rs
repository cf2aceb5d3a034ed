use std::cell::{Cell, RefCell};

use async_trait::async_trait;

use super::*;
use crate::net::types::LoginResponse;
use crate::util::storage::{MemoryStorage, NoopStorage};

// =============================================================
// Fixtures
// =============================================================

/// Scripted auth API: returns `next` for every call and counts calls.
struct FakeAuthApi {
    next: RefCell<Result<LoginResponse, AuthError>>,
    calls: Cell<usize>,
    last_token: RefCell<Option<String>>,
}

impl FakeAuthApi {
    fn returning(next: Result<LoginResponse, AuthError>) -> Rc<Self> {
        Rc::new(Self { next: RefCell::new(next), calls: Cell::new(0), last_token: RefCell::new(None) })
    }

    fn respond(&self) -> Result<LoginResponse, AuthError> {
        self.calls.set(self.calls.get() + 1);
        self.next.borrow().clone()
    }
}

#[async_trait(?Send)]
impl AuthApi for FakeAuthApi {
    async fn login(&self, _request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        self.respond()
    }

    async fn register(&self, _request: &RegisterRequest) -> Result<LoginResponse, AuthError> {
        self.respond()
    }

    async fn reset_password(&self, _email: &str) -> Result<(), AuthError> {
        self.respond().map(|_| ())
    }

    async fn update_profile(&self, token: &str, _update: &ProfileUpdate) -> Result<User, AuthError> {
        *self.last_token.borrow_mut() = Some(token.to_owned());
        self.respond().map(|r| r.user)
    }
}

fn teacher() -> User {
    User {
        id: "42".to_owned(),
        email: "t@learnmate.com".to_owned(),
        first_name: "Tess".to_owned(),
        last_name: "Teach".to_owned(),
        role: UserRole::Teacher,
        ..demo_user()
    }
}

fn server_ok() -> Result<LoginResponse, AuthError> {
    Ok(LoginResponse { token: "server-token".to_owned(), user: teacher() })
}

fn store_with(api: Rc<FakeAuthApi>) -> (SessionStore, Rc<MemoryStorage>) {
    let storage = Rc::new(MemoryStorage::new());
    let store = SessionStore::new(storage.clone(), api);
    (store, storage)
}

fn assert_consistent(store: &SessionStore) {
    assert_eq!(store.is_authenticated(), store.current_user().is_some());
    assert_eq!(store.snapshot().is_authenticated(), store.is_authenticated());
}

// =============================================================
// Initial state and restore
// =============================================================

#[test]
fn fresh_store_is_unauthenticated() {
    let (store, _) = store_with(FakeAuthApi::returning(server_ok()));
    assert!(store.current_user().is_none());
    assert!(!store.is_authenticated());
    assert!(store.token().is_none());
    assert_eq!(store.snapshot(), SessionSnapshot::default());
}

#[test]
fn restore_without_persisted_data_keeps_fresh_state() {
    let (store, _) = store_with(FakeAuthApi::returning(server_ok()));
    let notified = Rc::new(Cell::new(0));
    let n = notified.clone();
    store.subscribe(move |_| n.set(n.get() + 1));

    assert!(!store.restore());
    assert_eq!(store.snapshot(), SessionSnapshot::default());
    assert_eq!(notified.get(), 1, "only the initial replay");
}

#[test]
fn restore_populates_from_persisted_pair() {
    let (store, storage) = store_with(FakeAuthApi::returning(server_ok()));
    storage.set(AUTH_TOKEN_KEY, "persisted");
    storage.set(USER_DATA_KEY, &serde_json::to_string(&teacher()).unwrap());

    assert!(store.restore());
    assert_eq!(store.current_user(), Some(teacher()));
    assert_eq!(store.token().as_deref(), Some("persisted"));
    assert_consistent(&store);
}

#[test]
fn restore_notifies_observers() {
    let (store, storage) = store_with(FakeAuthApi::returning(server_ok()));
    storage.set(AUTH_TOKEN_KEY, "persisted");
    storage.set(USER_DATA_KEY, &serde_json::to_string(&teacher()).unwrap());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    store.subscribe(move |snap| s.borrow_mut().push(snap.is_authenticated()));

    assert!(store.restore());
    assert_eq!(*seen.borrow(), vec![false, true]);
}

#[test]
fn restore_with_corrupt_user_clears_storage() {
    let (store, storage) = store_with(FakeAuthApi::returning(server_ok()));
    storage.set(AUTH_TOKEN_KEY, "persisted");
    storage.set(USER_DATA_KEY, "{not json");

    assert!(matches!(store.try_restore(), Err(AuthError::PersistenceRead(_))));
    assert!(!store.restore());
    assert!(!store.is_authenticated());
    assert_eq!(storage.get(AUTH_TOKEN_KEY), None);
    assert_eq!(storage.get(USER_DATA_KEY), None);
}

#[test]
fn restore_ignores_token_without_user() {
    let (store, storage) = store_with(FakeAuthApi::returning(server_ok()));
    storage.set(AUTH_TOKEN_KEY, "orphan");

    assert!(!store.restore());
    assert!(!store.is_authenticated());
    assert_eq!(storage.get(AUTH_TOKEN_KEY).as_deref(), Some("orphan"));
}

#[test]
fn restore_without_persistence_is_skipped() {
    let store = SessionStore::new(Rc::new(NoopStorage), FakeAuthApi::returning(server_ok()));
    assert_eq!(store.try_restore(), Err(AuthError::PersistenceUnavailable));
    assert!(!store.restore());
    assert!(!store.is_authenticated());
}

// =============================================================
// Login
// =============================================================

#[tokio::test]
async fn demo_login_synthesizes_student_without_network() {
    let api = FakeAuthApi::returning(Err(AuthError::Transport("offline".to_owned())));
    let (store, storage) = store_with(api.clone());

    assert!(store.login(DEMO_EMAIL, DEMO_PASSWORD).await);
    let user = store.current_user().unwrap();
    assert_eq!(user, demo_user());
    assert_eq!(user.role, UserRole::Student);
    assert_eq!(store.token().as_deref(), Some(DEMO_TOKEN));
    assert_eq!(api.calls.get(), 0);
    assert_eq!(storage.get(AUTH_TOKEN_KEY).as_deref(), Some(DEMO_TOKEN));
    let persisted: User = serde_json::from_str(&storage.get(USER_DATA_KEY).unwrap()).unwrap();
    assert_eq!(persisted, demo_user());
}

#[tokio::test]
async fn demo_login_can_be_disabled() {
    let api = FakeAuthApi::returning(Err(AuthError::InvalidCredentials));
    let (store, _) = store_with(api.clone());
    let store = store.with_demo_login(false);

    assert!(!store.login(DEMO_EMAIL, DEMO_PASSWORD).await);
    assert_eq!(api.calls.get(), 1);
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn server_login_populates_and_persists() {
    let (store, storage) = store_with(FakeAuthApi::returning(server_ok()));

    let user = store.try_login("t@learnmate.com", "hunter22").await.unwrap();
    assert_eq!(user, teacher());
    assert_eq!(store.current_user(), Some(teacher()));
    assert_eq!(storage.get(AUTH_TOKEN_KEY).as_deref(), Some("server-token"));
    assert_consistent(&store);
}

#[tokio::test]
async fn failed_login_leaves_prior_state_untouched() {
    for failure in [AuthError::InvalidCredentials, AuthError::Transport("reset by peer".to_owned())] {
        let (store, storage) = store_with(FakeAuthApi::returning(Err(failure)));
        assert!(store.login(DEMO_EMAIL, DEMO_PASSWORD).await);
        let before = store.snapshot();

        assert!(!store.login("someone@else.com", "wrong").await);
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.token().as_deref(), Some(DEMO_TOKEN));
        assert_eq!(storage.get(AUTH_TOKEN_KEY).as_deref(), Some(DEMO_TOKEN));
    }
}

#[tokio::test]
async fn failed_login_from_empty_stays_empty() {
    let (store, storage) = store_with(FakeAuthApi::returning(Err(AuthError::InvalidCredentials)));
    assert_eq!(store.try_login("x@y.z", "nope").await, Err(AuthError::InvalidCredentials));
    assert!(store.current_user().is_none());
    assert!(storage.is_empty());
}

// =============================================================
// Logout
// =============================================================

#[tokio::test]
async fn logout_clears_memory_and_storage() {
    let (store, storage) = store_with(FakeAuthApi::returning(server_ok()));
    assert!(store.login("t@learnmate.com", "pw").await);

    store.logout();
    assert!(store.current_user().is_none());
    assert!(store.token().is_none());
    assert_eq!(storage.get(AUTH_TOKEN_KEY), None);
    assert_eq!(storage.get(USER_DATA_KEY), None);
    assert_consistent(&store);
}

#[test]
fn logout_when_logged_out_is_a_noop() {
    let (store, storage) = store_with(FakeAuthApi::returning(server_ok()));
    storage.set(USER_DATA_KEY, "stale");
    let notified = Rc::new(Cell::new(0));
    let n = notified.clone();
    store.subscribe(move |_| n.set(n.get() + 1));

    store.logout();
    store.logout();
    assert!(store.current_user().is_none());
    assert_eq!(storage.get(USER_DATA_KEY), None, "storage is cleared unconditionally");
    assert_eq!(notified.get(), 1);
}

#[tokio::test]
async fn auth_flag_tracks_user_across_mixed_sequences() {
    let api = FakeAuthApi::returning(Err(AuthError::InvalidCredentials));
    let (store, _) = store_with(api);
    let steps: [Option<(&str, &str)>; 7] = [
        Some(("bad@x.io", "pw")),
        Some((DEMO_EMAIL, DEMO_PASSWORD)),
        None,
        None,
        Some((DEMO_EMAIL, "wrong")),
        Some((DEMO_EMAIL, DEMO_PASSWORD)),
        None,
    ];
    for step in steps {
        match step {
            Some((email, password)) => {
                store.login(email, password).await;
            }
            None => store.logout(),
        }
        assert_consistent(&store);
    }
    assert!(store.current_user().is_none());
}

// =============================================================
// Observers
// =============================================================

#[tokio::test]
async fn observers_receive_transitions_in_subscription_order() {
    let (store, _) = store_with(FakeAuthApi::returning(server_ok()));
    let log = Rc::new(RefCell::new(Vec::new()));

    for name in ["header", "guard"] {
        let log = log.clone();
        store.subscribe(move |snap| log.borrow_mut().push((name, snap.is_authenticated())));
    }
    assert!(store.login(DEMO_EMAIL, DEMO_PASSWORD).await);
    store.logout();

    assert_eq!(
        *log.borrow(),
        vec![
            ("header", false),
            ("guard", false),
            ("header", true),
            ("guard", true),
            ("header", false),
            ("guard", false),
        ]
    );
}

#[tokio::test]
async fn late_subscriber_sees_only_latest_snapshot() {
    let (store, _) = store_with(FakeAuthApi::returning(server_ok()));
    assert!(store.login(DEMO_EMAIL, DEMO_PASSWORD).await);
    assert!(store.login("t@learnmate.com", "pw").await);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    store.subscribe(move |snap| s.borrow_mut().push(snap.role()));
    assert_eq!(*seen.borrow(), vec![Some(UserRole::Teacher)]);
}

#[tokio::test]
async fn unsubscribed_observer_is_not_called() {
    let (store, _) = store_with(FakeAuthApi::returning(server_ok()));
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let id = store.subscribe(move |_| c.set(c.get() + 1));

    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));
    assert!(store.login(DEMO_EMAIL, DEMO_PASSWORD).await);
    assert_eq!(calls.get(), 1);
}

#[tokio::test]
async fn observer_may_read_store_during_dispatch() {
    let (store, _) = store_with(FakeAuthApi::returning(server_ok()));
    let reader = store.clone();
    let seen = Rc::new(RefCell::new(None));
    let s = seen.clone();
    store.subscribe(move |_| *s.borrow_mut() = reader.current_user().map(|u| u.email));

    assert!(store.login(DEMO_EMAIL, DEMO_PASSWORD).await);
    assert_eq!(seen.borrow().as_deref(), Some(DEMO_EMAIL));
}

// =============================================================
// Register, reset, profile
// =============================================================

#[tokio::test]
async fn register_logs_in_as_new_user() {
    let (store, _) = store_with(FakeAuthApi::returning(server_ok()));
    let request = RegisterRequest {
        email: "t@learnmate.com".to_owned(),
        password: "secret1".to_owned(),
        first_name: "Tess".to_owned(),
        last_name: "Teach".to_owned(),
        role: UserRole::Teacher,
    };
    assert!(store.register(&request).await);
    assert_eq!(store.current_user(), Some(teacher()));
}

#[tokio::test]
async fn reset_password_reports_outcome_without_touching_state() {
    let (ok_store, _) = store_with(FakeAuthApi::returning(server_ok()));
    assert!(ok_store.reset_password("t@learnmate.com").await);
    assert!(!ok_store.is_authenticated());

    let (err_store, _) = store_with(FakeAuthApi::returning(Err(AuthError::Transport("down".to_owned()))));
    assert!(!err_store.reset_password("t@learnmate.com").await);
}

#[tokio::test]
async fn update_profile_requires_token() {
    let api = FakeAuthApi::returning(server_ok());
    let (store, _) = store_with(api.clone());
    let update = ProfileUpdate { first_name: Some("Tess".to_owned()), ..ProfileUpdate::default() };

    assert_eq!(store.try_update_profile(&update).await, Err(AuthError::NotAuthenticated));
    assert_eq!(api.calls.get(), 0);
}

#[tokio::test]
async fn update_profile_replaces_user_and_keeps_token() {
    let api = FakeAuthApi::returning(server_ok());
    let (store, storage) = store_with(api.clone());
    assert!(store.login(DEMO_EMAIL, DEMO_PASSWORD).await);

    assert!(store.update_profile(&ProfileUpdate::default()).await);
    assert_eq!(api.last_token.borrow().as_deref(), Some(DEMO_TOKEN));
    assert_eq!(store.current_user(), Some(teacher()));
    assert_eq!(store.token().as_deref(), Some(DEMO_TOKEN));
    let persisted: User = serde_json::from_str(&storage.get(USER_DATA_KEY).unwrap()).unwrap();
    assert_eq!(persisted, teacher());
}

/// Auth API whose profile call ends the session before answering, the way a
/// logout lands while the request is still in flight.
struct LogoutDuringProfileApi {
    store: RefCell<Option<SessionStore>>,
    relogin_as_teacher: bool,
}

#[async_trait(?Send)]
impl AuthApi for LogoutDuringProfileApi {
    async fn login(&self, _request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        server_ok()
    }

    async fn register(&self, _request: &RegisterRequest) -> Result<LoginResponse, AuthError> {
        server_ok()
    }

    async fn reset_password(&self, _email: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn update_profile(&self, _token: &str, _update: &ProfileUpdate) -> Result<User, AuthError> {
        let store = self.store.borrow().clone().expect("store wired before use");
        store.logout();
        if self.relogin_as_teacher {
            assert!(store.login("t@learnmate.com", "secret1").await);
        }
        Ok(User { first_name: "Late".to_owned(), ..teacher() })
    }
}

fn store_with_logout_during_profile(relogin_as_teacher: bool) -> (SessionStore, Rc<MemoryStorage>) {
    let api = Rc::new(LogoutDuringProfileApi { store: RefCell::new(None), relogin_as_teacher });
    let storage = Rc::new(MemoryStorage::new());
    let store = SessionStore::new(storage.clone(), api.clone());
    *api.store.borrow_mut() = Some(store.clone());
    (store, storage)
}

#[tokio::test]
async fn logout_during_profile_update_is_not_undone() {
    let (store, storage) = store_with_logout_during_profile(false);
    assert!(store.login(DEMO_EMAIL, DEMO_PASSWORD).await);

    assert_eq!(store.try_update_profile(&ProfileUpdate::default()).await, Err(AuthError::NotAuthenticated));
    assert!(store.current_user().is_none());
    assert!(store.token().is_none());
    assert_eq!(storage.get(AUTH_TOKEN_KEY), None);
    assert_eq!(storage.get(USER_DATA_KEY), None);
    assert_consistent(&store);
}

#[tokio::test]
async fn profile_response_does_not_overwrite_newer_session() {
    let (store, storage) = store_with_logout_during_profile(true);
    assert!(store.login(DEMO_EMAIL, DEMO_PASSWORD).await);

    assert!(!store.update_profile(&ProfileUpdate::default()).await);
    assert_eq!(store.current_user(), Some(teacher()));
    assert_eq!(store.token().as_deref(), Some("server-token"));
    assert_eq!(storage.get(AUTH_TOKEN_KEY).as_deref(), Some("server-token"));
}
