//! Error kinds for session and auth-endpoint operations.
//!
//! None of these are fatal. `SessionStore` collapses them into boolean
//! outcomes for UI callers; the `try_*` variants expose them directly.

/// Failure of an auth operation or of session persistence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The auth endpoint rejected the credentials (401/403).
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Network failure, non-2xx status, or an undecodable response body.
    #[error("auth transport failure: {0}")]
    Transport(String),
    /// Persisted session data exists but could not be parsed.
    #[error("persisted session unreadable: {0}")]
    PersistenceRead(String),
    /// No persistent storage in this execution context.
    #[error("persistent storage unavailable")]
    PersistenceUnavailable,
    /// The operation needs a session token and none is held.
    #[error("not authenticated")]
    NotAuthenticated,
}

impl AuthError {
    /// Map a non-2xx HTTP status to an error kind.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::InvalidCredentials,
            other => Self::Transport(format!("unexpected status {other}")),
        }
    }

    #[must_use]
    pub fn is_credential_failure(&self) -> bool {
        matches!(self, Self::InvalidCredentials)
    }
}
