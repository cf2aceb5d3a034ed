//! Auth endpoint client.
//!
//! Browser (hydrate): HTTP via `gloo-net`.
//! Native (tests, SSR hosts): HTTP via `reqwest`.
//! Anything else (wasm without `hydrate`): every call fails as a transport
//! error, which `SessionStore` reports as a failed login.
//!
//! ERROR HANDLING
//! ==============
//! 401/403 map to `InvalidCredentials`; any other non-2xx, connection error
//! or undecodable body maps to `Transport`. Nothing here panics.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{LoginRequest, LoginResponse, ProfileUpdate, RegisterRequest, User};
use crate::config::ClientConfig;
use crate::error::AuthError;

/// The external authentication collaborator.
///
/// `?Send` because the client runs on a single cooperative thread and the
/// browser futures are not `Send`.
#[async_trait(?Send)]
pub trait AuthApi {
    /// `POST /login`.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError>;

    /// `POST /register`.
    async fn register(&self, request: &RegisterRequest) -> Result<LoginResponse, AuthError>;

    /// `POST /reset-password`.
    async fn reset_password(&self, email: &str) -> Result<(), AuthError>;

    /// `PUT /profile` authorized with the session token.
    async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> Result<User, AuthError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Method {
    Post,
    Put,
}

/// HTTP implementation of [`AuthApi`].
#[derive(Clone, Debug)]
pub struct HttpAuthApi {
    base_url: String,
    #[cfg(all(not(feature = "hydrate"), not(target_arch = "wasm32")))]
    client: reqwest::Client,
}

impl HttpAuthApi {
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.auth_api_url.trim_end_matches('/').to_owned(),
            #[cfg(all(not(feature = "hydrate"), not(target_arch = "wasm32")))]
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send `body` as JSON and return the raw response text on 2xx.
    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<String, AuthError> {
        let url = self.endpoint(path);

        #[cfg(feature = "hydrate")]
        {
            let mut builder = match method {
                Method::Post => gloo_net::http::Request::post(&url),
                Method::Put => gloo_net::http::Request::put(&url),
            };
            if let Some(token) = bearer {
                builder = builder.header("Authorization", &format!("Bearer {token}"));
            }
            let resp = builder
                .json(body)
                .map_err(|e| AuthError::Transport(e.to_string()))?
                .send()
                .await
                .map_err(|e| AuthError::Transport(e.to_string()))?;
            if !resp.ok() {
                return Err(AuthError::from_status(resp.status()));
            }
            resp.text().await.map_err(|e| AuthError::Transport(e.to_string()))
        }
        #[cfg(all(not(feature = "hydrate"), not(target_arch = "wasm32")))]
        {
            let builder = match method {
                Method::Post => self.client.post(&url),
                Method::Put => self.client.put(&url),
            };
            let builder = match bearer {
                Some(token) => builder.bearer_auth(token),
                None => builder,
            };
            let resp = builder
                .json(body)
                .send()
                .await
                .map_err(|e| AuthError::Transport(e.to_string()))?;
            let status = resp.status();
            if !status.is_success() {
                return Err(AuthError::from_status(status.as_u16()));
            }
            resp.text().await.map_err(|e| AuthError::Transport(e.to_string()))
        }
        #[cfg(all(not(feature = "hydrate"), target_arch = "wasm32"))]
        {
            let _ = (url, method, body, bearer);
            Err(AuthError::Transport("not available on server".to_owned()))
        }
    }
}

fn decode<R: DeserializeOwned>(body: &str) -> Result<R, AuthError> {
    serde_json::from_str(body).map_err(|e| AuthError::Transport(format!("invalid response body: {e}")))
}

#[async_trait(?Send)]
impl AuthApi for HttpAuthApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        let body = self.send(Method::Post, "login", request, None).await?;
        decode(&body)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<LoginResponse, AuthError> {
        let body = self.send(Method::Post, "register", request, None).await?;
        decode(&body)
    }

    async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let payload = serde_json::json!({ "email": email });
        self.send(Method::Post, "reset-password", &payload, None).await?;
        Ok(())
    }

    async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> Result<User, AuthError> {
        let body = self.send(Method::Put, "profile", update, Some(token)).await?;
        decode(&body)
    }
}
