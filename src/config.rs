//! Client configuration parsed from environment variables.
//!
//! In the browser there is no process environment, so every lookup misses
//! and `from_env` yields the same values as `Default`.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_AUTH_API_URL: &str = "http://localhost:3000/api/auth";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the auth endpoints, without a trailing slash.
    pub auth_api_url: String,
    /// Accept the built-in demo credentials without calling the server.
    pub demo_login_enabled: bool,
    /// Whole-request timeout for the native HTTP client.
    pub http_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth_api_url: DEFAULT_AUTH_API_URL.to_owned(),
            demo_login_enabled: true,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Build config from the environment.
    ///
    /// Optional:
    /// - `LEARNMATE_API_URL`: auth base URL, default `http://localhost:3000/api/auth`
    /// - `LEARNMATE_DEMO_LOGIN`: `1/true/yes/on` or `0/false/no/off`, default on
    /// - `LEARNMATE_HTTP_TIMEOUT_SECS`: default 30
    #[must_use]
    pub fn from_env() -> Self {
        let auth_api_url = std::env::var("LEARNMATE_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AUTH_API_URL.to_owned())
            .trim()
            .trim_end_matches('/')
            .to_owned();
        Self {
            auth_api_url,
            demo_login_enabled: env_bool("LEARNMATE_DEMO_LOGIN").unwrap_or(true),
            http_timeout_secs: env_parse_u64("LEARNMATE_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
