//! Header with primary navigation and the signed-in user's menu.
//!
//! The header is a session observer: it renders from the context snapshot
//! and logs out through the store, which broadcasts the change to the guards.

use leptos::prelude::*;
use leptos_router::hooks::use_location;

use crate::util::auth::use_session;
use crate::util::nav::{NAV_ITEMS, is_active_route};

#[component]
pub fn Header() -> impl IntoView {
    let session = use_session();
    let pathname = use_location().pathname;
    let show_menu = RwSignal::new(false);

    let initials = move || session.snapshot.get().user.map_or_else(|| "U".to_owned(), |u| u.initials());
    let display_name = move || session.snapshot.get().user.map_or_else(|| "User".to_owned(), |u| u.display_name());

    let on_logout = move |_| {
        session.store().logout();
        show_menu.set(false);
    };

    view! {
        <header class="header">
            <a class="header__brand" href="/">"LearnMate"</a>
            <Show when=move || session.snapshot.get().is_authenticated()>
                <nav class="header__nav">
                    {NAV_ITEMS
                        .iter()
                        .map(|item| {
                            let path = item.path;
                            view! {
                                <a
                                    href=path
                                    title=item.description
                                    class:active=move || is_active_route(&pathname.get(), path)
                                >
                                    {item.label}
                                </a>
                            }
                        })
                        .collect_view()}
                </nav>
                <div class="header__profile">
                    <button class="header__avatar" on:click=move |_| show_menu.update(|v| *v = !*v)>
                        {initials}
                    </button>
                    <Show when=move || show_menu.get()>
                        <div class="header__menu">
                            <span class="header__name">{display_name}</span>
                            <button class="header__logout" on:click=on_logout>"Log out"</button>
                        </div>
                    </Show>
                </div>
            </Show>
        </header>
    }
}
