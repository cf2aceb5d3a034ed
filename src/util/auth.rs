//! Leptos glue between the session store and the router.
//!
//! SYSTEM CONTEXT
//! ==============
//! `provide_session` puts one `SessionStore` into context together with a
//! reactive mirror of its snapshot, kept current by a store subscription.
//! Pages install guards and read the signal; only the store mutates session
//! state.

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_location;

use crate::state::session::{SessionSnapshot, SessionStore};
use crate::util::guard::{GuardDecision, RouteGuard, requested_url, take_redirect_url};

/// Session handle shared through context.
#[derive(Clone, Copy)]
pub struct SessionContext {
    pub store: StoredValue<SessionStore, LocalStorage>,
    pub snapshot: RwSignal<SessionSnapshot>,
}

impl SessionContext {
    #[must_use]
    pub fn store(&self) -> SessionStore {
        self.store.get_value()
    }
}

/// Provide `store` to the component tree and mirror it into a signal.
pub fn provide_session(store: SessionStore) -> SessionContext {
    let snapshot = RwSignal::new(store.snapshot());
    store.subscribe(move |snap| snapshot.set(snap.clone()));
    let ctx = SessionContext { store: StoredValue::new_local(store), snapshot };
    provide_context(ctx);
    ctx
}

/// Fetch the session context provided by `App`.
pub fn use_session() -> SessionContext {
    expect_context::<SessionContext>()
}

/// Re-run `guard` whenever the session changes, and navigate away on
/// denial. The guard is mounted on its own route, so the location is read
/// untracked; a denial records the full URL including query and fragment.
pub fn install_route_guard<F>(ctx: SessionContext, guard: RouteGuard, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    let location = use_location();
    let (pathname, search, hash) = (location.pathname, location.search, location.hash);
    Effect::new(move || {
        let snapshot = ctx.snapshot.get();
        let url = requested_url(&pathname.get_untracked(), &search.get_untracked(), &hash.get_untracked());
        let decision = ctx.store.with_value(|store| guard.decide(&snapshot, &**store.storage(), &url));
        if let GuardDecision::Redirect(target) = decision {
            navigate(target, NavigateOptions::default());
        }
    });
}

/// Leave the login page for the recorded redirect target once a session
/// exists, whether it came from a submit or a restore.
pub fn install_authenticated_redirect<F>(ctx: SessionContext, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        if ctx.snapshot.get().is_authenticated() {
            let target = ctx.store.with_value(|store| take_redirect_url(&**store.storage()));
            navigate(&target, NavigateOptions::default());
        }
    });
}
