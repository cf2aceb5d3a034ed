//! Guarded section pages that only need a title and a guard.
//!
//! Their content (analytics charts, tutor chat, assignments, admin tools)
//! lives outside this crate; these pages exist so the router has a guarded
//! mount point for each view.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::util::auth::{install_route_guard, use_session};
use crate::util::guard::RouteGuard;

#[component]
pub fn GuardedSection(title: &'static str, guard: RouteGuard) -> impl IntoView {
    let session = use_session();
    install_route_guard(session, guard, use_navigate());

    let allowed = move || {
        let snapshot = session.snapshot.get();
        match guard {
            RouteGuard::Authenticated => snapshot.is_authenticated(),
            RouteGuard::Admin => snapshot.user.is_some_and(|u| u.is_admin()),
        }
    };

    view! {
        <Show when=allowed>
            <section class="section-page">
                <h1>{title}</h1>
            </section>
        </Show>
    }
}

#[component]
pub fn AnalyticsPage() -> impl IntoView {
    view! { <GuardedSection title="Analytics" guard=RouteGuard::Authenticated/> }
}

#[component]
pub fn StudyCompanionPage() -> impl IntoView {
    view! { <GuardedSection title="Assignments" guard=RouteGuard::Authenticated/> }
}

#[component]
pub fn AiTutorPage() -> impl IntoView {
    view! { <GuardedSection title="AI Tutor" guard=RouteGuard::Authenticated/> }
}

#[component]
pub fn AdminPage() -> impl IntoView {
    view! { <GuardedSection title="Administration" guard=RouteGuard::Admin/> }
}
