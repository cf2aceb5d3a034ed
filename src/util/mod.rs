//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns (storage, routing
//! glue) from page logic to improve reuse and testability.

pub mod auth;
pub mod guard;
pub mod nav;
pub mod storage;
