//! The request pipeline every backend call goes through.
//!
//! `ApiClient::execute` attaches the bearer token, recovers once from an
//! expired access token by refreshing and replaying, and reports failures to
//! the notification queue. Errors are always handed back to the caller.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{ApiError, ApiRequest, ApiResponse};
use crate::config::Config;
use crate::notifications::NotificationQueue;
use crate::session::{HttpAuthBackend, SessionError, SessionStore};
use crate::storage::SessionStorage;

/// Shown when the access token expired and could not be renewed.
pub const SESSION_EXPIRED_NOTICE: &str = "Sesión expirada. Por favor, inicia sesión nuevamente.";

/// One refresh-and-replay per logical request.
///
/// Spent before the refresh starts, so a 401 on the replay is final.
#[derive(Debug, Default)]
struct RetryBudget {
    spent: bool,
}

impl RetryBudget {
    fn try_spend(&mut self) -> bool {
        !std::mem::replace(&mut self.spent, true)
    }
}

/// API client for the asistencia backend.
/// Clone is cheap - reqwest::Client and the shared services are reference counted.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
    notifications: NotificationQueue,
}

impl ApiClient {
    /// Build the HTTP client shared by the pipeline and the auth backend.
    pub fn http_client(timeout: Duration) -> Result<Client, ApiError> {
        Ok(Client::builder().timeout(timeout).build()?)
    }

    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        session: Arc<SessionStore>,
        notifications: NotificationQueue,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            notifications,
        }
    }

    /// Wire a pipeline, its session store and the HTTP auth backend from
    /// configuration. The session is not initialized here.
    pub fn connect(
        config: &Config,
        storage: Arc<dyn SessionStorage>,
        notifications: NotificationQueue,
    ) -> Result<Self, ApiError> {
        let client = Self::http_client(config.request_timeout())?;
        let backend = HttpAuthBackend::new(client.clone(), config.normalized_base_url());
        let session = Arc::new(SessionStore::new(Arc::new(backend), storage));
        Ok(Self::new(client, config.normalized_base_url(), session, notifications))
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue `request`, recovering once from a 401 via token refresh.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut budget = RetryBudget::default();

        loop {
            let error = match self.dispatch(request).await {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };

            if error.is_unauthorized() && budget.try_spend() {
                debug!(path = request.path(), "Access token rejected, attempting refresh");
                match self.session.refresh().await {
                    Ok(()) => {
                        info!(path = request.path(), "Token refreshed, replaying request");
                        continue;
                    }
                    Err(refresh_error) => {
                        warn!(path = request.path(), error = %refresh_error, "Could not recover from 401");
                        if !matches!(refresh_error, SessionError::MissingRefreshToken) {
                            self.notifications.error(SESSION_EXPIRED_NOTICE);
                        }
                        return Err(error);
                    }
                }
            }

            self.report(request, &error);
            return Err(error);
        }
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, request.path());
        let mut builder = self.client.request(request.method().clone(), &url);

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(token) = self.session.access_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        debug!(method = %request.method(), url = %url, "Sending request");
        let response = builder.send().await?;
        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                // The status arrived, so this is not a connectivity failure.
                warn!(status = status.as_u16(), error = %e, "Response body was cut short");
                if status.is_success() {
                    return Err(ApiError::InvalidResponse(format!("Failed to read response body: {}", e)));
                }
                return Err(ApiError::from_status(status, ""));
            }
        };

        if status.is_success() {
            debug!(status = status.as_u16(), bytes = body.len(), "Response received");
            return Ok(ApiResponse::new(status, body.to_vec()));
        }

        let text = String::from_utf8_lossy(&body);
        debug!(status = status.as_u16(), body = %ApiError::truncate_body(&text), "Error response body");
        Err(ApiError::from_status(status, &text))
    }

    /// Log a final failure and push its notice, if it has one.
    fn report(&self, request: &ApiRequest, error: &ApiError) {
        warn!(
            method = %request.method(),
            path = request.path(),
            status = ?error.status(),
            error = %error,
            "Request failed"
        );
        if let Some(notice) = error.user_notice(request.is_marking()) {
            self.notifications.error(notice);
        }
    }

    // ===== Typed helpers =====

    pub async fn fetch<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        self.execute(request).await?.json()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.fetch(&ApiRequest::get(path)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.fetch(&ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.fetch(&ApiRequest::put(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(&ApiRequest::delete(path)).await.map(|_| ())
    }
}
