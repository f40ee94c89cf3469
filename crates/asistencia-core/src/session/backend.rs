//! Credential exchange and token refresh against the backend.
//!
//! These two calls bypass the request pipeline: they carry no bearer token,
//! must never trigger a refresh themselves, and report failures through the
//! session store rather than the notification queue.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::ApiError;

const LOGIN_PATH: &str = "/auth/login";
const REFRESH_PATH: &str = "/auth/refresh";

fn default_token_type() -> String {
    "Bearer".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
struct RefreshRequest<'a> {
    #[serde(rename = "refreshToken")]
    refresh_token: &'a str,
}

/// Body of both the login and the refresh responses.
///
/// Refresh responses are only guaranteed to carry the access token, type and
/// expiry; the refresh token and username are optional there.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenResponse {
    #[serde(rename = "accessToken", alias = "token")]
    pub access_token: String,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
    #[serde(rename = "tokenType", default = "default_token_type")]
    pub token_type: String,
    #[serde(rename = "expiresIn", default)]
    pub expires_in: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError>;

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, ApiError>;
}

/// `AuthBackend` over HTTP. Shares the pipeline's connection pool.
#[derive(Clone)]
pub struct HttpAuthBackend {
    client: Client,
    base_url: String,
}

impl HttpAuthBackend {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_tokens<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<TokenResponse, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Sending auth request");

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), body = %ApiError::truncate_body(&text), "Auth request rejected");
            return Err(ApiError::from_status(status, &text));
        }

        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse token response: {}", e)))
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        self.post_tokens(LOGIN_PATH, credentials).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, ApiError> {
        self.post_tokens(REFRESH_PATH, &RefreshRequest { refresh_token }).await
    }
}
