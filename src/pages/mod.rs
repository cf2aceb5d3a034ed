//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns its guard installation and reads the session through
//! context; none of them mutate it except through `SessionStore` calls.

pub mod dashboard;
pub mod home;
pub mod login;
pub mod section;
