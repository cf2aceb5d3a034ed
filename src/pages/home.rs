//! Public landing page.

use leptos::prelude::*;

use crate::util::auth::use_session;

#[component]
pub fn HomePage() -> impl IntoView {
    let session = use_session();
    let (href, label) = (
        move || if session.snapshot.get().is_authenticated() { "/dashboard" } else { "/login" },
        move || if session.snapshot.get().is_authenticated() { "Go to my courses" } else { "Sign in" },
    );

    view! {
        <section class="home">
            <h1>"LearnMate"</h1>
            <p>"Courses, progress analytics and an AI tutor in one place."</p>
            <a class="home__cta" href=href>{label}</a>
        </section>
    }
}
