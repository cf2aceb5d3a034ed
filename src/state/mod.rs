//! Shared client-side state.
//!
//! DESIGN
//! ======
//! Only the session lives here; page-local UI state stays in the pages as
//! plain signals.

pub mod session;
