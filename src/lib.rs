//! # learnmate
//!
//! Leptos + WASM client for the LearnMate learning platform.
//!
//! The core is the client-side session: [`state::session::SessionStore`]
//! owns who is logged in, persists it through a capability-checked
//! key-value store, and notifies observers; [`util::guard`] decides whether
//! a protected route may be entered. Pages and the header are thin
//! observers mounted by [`app::App`].

pub mod app;
pub mod components;
pub mod config;
pub mod error;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// Browser entry point: hydrate the server-rendered shell.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
