//! Networking modules for the auth endpoints.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` handles the HTTP calls and `types` defines the shared wire schema.

pub mod api;
pub mod types;
