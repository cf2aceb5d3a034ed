//! Dashboard page: the default authenticated landing view.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::util::auth::{install_route_guard, use_session};
use crate::util::guard::RouteGuard;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let session = use_session();
    install_route_guard(session, RouteGuard::Authenticated, use_navigate());

    let greeting = move || {
        session
            .snapshot
            .get()
            .user
            .map(|u| format!("Welcome back, {}!", u.first_name))
            .unwrap_or_default()
    };
    let courses = move || session.snapshot.get().user.map_or(0, |u| u.enrolled_courses.len());

    view! {
        <Show when=move || session.snapshot.get().is_authenticated()>
            <section class="dashboard">
                <h1>{greeting}</h1>
                <p class="dashboard__summary">{move || format!("Enrolled courses: {}", courses())}</p>
            </section>
        </Show>
    }
}
