//! Login page: email + password form with a one-click demo account.
//!
//! SYSTEM CONTEXT
//! ==============
//! The page never navigates on submit itself. A successful login changes the
//! session snapshot, and `install_authenticated_redirect` then sends the user
//! to the path a guard recorded (or the dashboard). The same effect handles
//! visiting `/login` with a restored session.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::state::session::{DEMO_EMAIL, DEMO_PASSWORD};
use crate::util::auth::{install_authenticated_redirect, use_session};
use crate::util::storage::{KeyValueStorage, REMEMBER_ME_KEY};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials.";

/// Loose address check: one `@`, non-empty local part and domain, no spaces.
pub(crate) fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

pub(crate) fn email_error(email: &str) -> Option<&'static str> {
    let email = email.trim();
    if email.is_empty() {
        Some("Email is required")
    } else if !is_valid_email(email) {
        Some("Please enter a valid email address")
    } else {
        None
    }
}

pub(crate) fn password_error(password: &str) -> Option<String> {
    if password.is_empty() {
        Some("Password is required".to_owned())
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        Some(format!("Password must be at least {MIN_PASSWORD_LEN} characters"))
    } else {
        None
    }
}

/// Trimmed email and raw password, or the first field error.
pub(crate) fn validate_login_input(email: &str, password: &str) -> Result<(String, String), String> {
    if let Some(err) = email_error(email) {
        return Err(err.to_owned());
    }
    if let Some(err) = password_error(password) {
        return Err(err);
    }
    Ok((email.trim().to_owned(), password.to_owned()))
}

/// Persist the "remember me" choice after a successful login.
pub(crate) fn remember_me(storage: &dyn KeyValueStorage, enabled: bool) {
    if enabled {
        storage.set(REMEMBER_ME_KEY, "true");
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let session = use_session();
    install_authenticated_redirect(session, use_navigate());

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let remember = RwSignal::new(false);
    let show_password = RwSignal::new(false);
    let error = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let submit = move || {
        if busy.get() {
            return;
        }
        let (email_value, password_value) = match validate_login_input(&email.get(), &password.get()) {
            Ok(input) => input,
            Err(msg) => {
                error.set(msg);
                return;
            }
        };
        busy.set(true);
        error.set(String::new());

        #[cfg(feature = "hydrate")]
        {
            let store = session.store();
            let remember_value = remember.get();
            leptos::task::spawn_local(async move {
                if store.login(&email_value, &password_value).await {
                    remember_me(&**store.storage(), remember_value);
                } else {
                    error.set(LOGIN_FAILED_MESSAGE.to_owned());
                }
                busy.set(false);
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (email_value, password_value);
            busy.set(false);
        }
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        submit();
    };

    let on_demo = move |_| {
        email.set(DEMO_EMAIL.to_owned());
        password.set(DEMO_PASSWORD.to_owned());
        submit();
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"LearnMate"</h1>
                <p class="login-card__subtitle">"Sign in to continue learning"</p>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type=move || if show_password.get() { "text" } else { "password" }
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <label class="login-checkbox">
                        <input
                            type="checkbox"
                            prop:checked=move || show_password.get()
                            on:change=move |ev| show_password.set(event_target_checked(&ev))
                        />
                        "Show password"
                    </label>
                    <label class="login-checkbox">
                        <input
                            type="checkbox"
                            prop:checked=move || remember.get()
                            on:change=move |ev| remember.set(event_target_checked(&ev))
                        />
                        "Remember me"
                    </label>
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Sign In"
                    </button>
                </form>
                <button class="login-button login-button--demo" type="button" disabled=move || busy.get() on:click=on_demo>
                    "Try the demo account"
                </button>
                <Show when=move || !error.get().is_empty()>
                    <p class="login-message">{move || error.get()}</p>
                </Show>
            </div>
        </div>
    }
}
