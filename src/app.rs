//! Root application component with routing and the session context.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Redirect, Route, Router, Routes},
};

use crate::components::header::Header;
use crate::config::ClientConfig;
use crate::pages::{
    dashboard::DashboardPage,
    home::HomePage,
    login::LoginPage,
    section::{AdminPage, AiTutorPage, AnalyticsPage, StudyCompanionPage},
};
use crate::state::session::SessionStore;
use crate::util::auth::provide_session;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Creates the session store, restores any persisted session before the
/// first route renders, and provides it to every page.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let store = SessionStore::from_config(&ClientConfig::from_env());
    store.restore();
    provide_session(store);

    view! {
        <Stylesheet id="leptos" href="/pkg/learnmate.css"/>
        <Title text="LearnMate"/>

        <Router>
            <Header/>
            <main>
                <Routes fallback=|| view! { <Redirect path="/"/> }>
                    <Route path=StaticSegment("") view=HomePage/>
                    <Route path=StaticSegment("home") view=HomePage/>
                    <Route path=StaticSegment("login") view=LoginPage/>
                    <Route path=StaticSegment("dashboard") view=DashboardPage/>
                    <Route path=StaticSegment("analytics") view=AnalyticsPage/>
                    <Route path=StaticSegment("study-companion") view=StudyCompanionPage/>
                    <Route path=StaticSegment("ai-tutor") view=AiTutorPage/>
                    <Route path=StaticSegment("admin") view=AdminPage/>
                </Routes>
            </main>
        </Router>
    }
}
