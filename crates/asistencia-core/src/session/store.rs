use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::backend::{AuthBackend, Credentials, TokenResponse};
use super::SessionError;
use crate::api::ApiError;
use crate::storage::{
    SessionStorage, StorageError, AUTH_TOKEN_KEY, EXPIRES_IN_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS,
    TOKEN_TYPE_KEY, USER_KEY,
};

/// The backend's login response names the user but carries no id.
const UNKNOWN_USER_ID: i64 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Observable session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Resets `is_loading` however the login future ends, including when it is
/// dropped mid-flight.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<SessionState>,
}

impl<'a> LoadingGuard<'a> {
    fn start(state: &'a watch::Sender<SessionState>) -> Self {
        state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.is_loading = false);
    }
}

/// Owns the token pair and the current user.
///
/// State only changes through `login`, `logout`, `refresh`, `initialize` and
/// `clear_error`. Readers take snapshots or subscribe to changes.
pub struct SessionStore {
    backend: Arc<dyn AuthBackend>,
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<SessionState>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SessionStore")
            .field("authenticated", &state.is_authenticated())
            .field("user", &state.user)
            .field("is_loading", &state.is_loading)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Build the store, picking up any persisted token pair. No network.
    pub fn new(backend: Arc<dyn AuthBackend>, storage: Arc<dyn SessionStorage>) -> Self {
        let initial = SessionState {
            access_token: read_key(storage.as_ref(), AUTH_TOKEN_KEY),
            refresh_token: read_key(storage.as_ref(), REFRESH_TOKEN_KEY),
            ..SessionState::default()
        };
        debug!(has_token = initial.access_token.is_some(), "Session store created");
        let (state, _) = watch::channel(initial);
        Self {
            backend,
            storage,
            state,
        }
    }

    /// Restore the persisted user record when a token is held.
    ///
    /// A corrupt record clears the whole session; nothing is reported to the
    /// caller beyond the resulting logged-out state.
    pub fn initialize(&self) {
        if !self.is_authenticated() {
            return;
        }
        let Some(raw) = read_key(self.storage.as_ref(), USER_KEY) else {
            return;
        };

        match serde_json::from_str::<User>(&raw) {
            Ok(user) => {
                debug!(username = %user.username, "Restored persisted user");
                self.state.send_modify(|s| s.user = Some(user));
            }
            Err(e) => {
                warn!(error = %e, "Stored user record is corrupt, clearing session");
                self.logout();
            }
        }
    }

    /// Exchange credentials for a token pair.
    ///
    /// On failure `error` holds the backend's message (or a generic one) and
    /// the error is returned as well.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), SessionError> {
        let _loading = LoadingGuard::start(&self.state);

        let result = self.exchange_credentials(username, password).await;
        if let Err(ref e) = result {
            warn!(username, error = %e, "Login failed");
            let message = e.user_message();
            self.state.send_modify(|s| s.error = Some(message));
        }
        result
    }

    async fn exchange_credentials(&self, username: &str, password: &str) -> Result<(), SessionError> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let tokens = self.backend.login(&credentials).await?;

        let refresh_token = tokens
            .refresh_token
            .clone()
            .ok_or_else(|| ApiError::InvalidResponse("login response has no refreshToken".to_string()))?;
        let user = User {
            id: UNKNOWN_USER_ID,
            username: tokens.username.clone().unwrap_or_else(|| username.to_string()),
            email: None,
        };

        if let Err(e) = self.persist_login(&tokens, &refresh_token, &user) {
            // A half-written session would be picked up on the next start.
            self.clear_persisted();
            return Err(e);
        }

        info!(username = %user.username, "Logged in");
        self.state.send_modify(|s| {
            s.access_token = Some(tokens.access_token);
            s.refresh_token = Some(refresh_token);
            s.user = Some(user);
            s.error = None;
        });
        Ok(())
    }

    fn persist_login(&self, tokens: &TokenResponse, refresh_token: &str, user: &User) -> Result<(), SessionError> {
        let user_json = serde_json::to_string(user).map_err(StorageError::from)?;
        self.storage.set(AUTH_TOKEN_KEY, &tokens.access_token)?;
        self.storage.set(REFRESH_TOKEN_KEY, refresh_token)?;
        self.storage.set(USER_KEY, &user_json)?;
        self.persist_token_metadata(tokens)
    }

    /// Forget the session in memory and on disk. Never fails.
    pub fn logout(&self) {
        self.state.send_modify(|s| {
            s.access_token = None;
            s.refresh_token = None;
            s.user = None;
            s.error = None;
        });
        self.clear_persisted();
        info!("Logged out");
    }

    fn clear_persisted(&self) {
        for key in SESSION_KEYS {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to remove persisted session entry");
            }
        }
    }

    /// Obtain a new access token with the held refresh token.
    ///
    /// Only the access token and its metadata change. Any failure, including
    /// having no refresh token, logs the session out before returning.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        let result = match self.refresh_token() {
            Some(refresh_token) => self.renew_access_token(&refresh_token).await,
            None => Err(SessionError::MissingRefreshToken),
        };

        if let Err(ref e) = result {
            warn!(error = %e, "Token refresh failed, logging out");
            self.logout();
        }
        result
    }

    async fn renew_access_token(&self, refresh_token: &str) -> Result<(), SessionError> {
        let tokens = self.backend.refresh(refresh_token).await?;

        self.storage.set(AUTH_TOKEN_KEY, &tokens.access_token)?;
        self.persist_token_metadata(&tokens)?;

        debug!(expires_in = tokens.expires_in, "Access token renewed");
        self.state.send_modify(|s| s.access_token = Some(tokens.access_token));
        Ok(())
    }

    fn persist_token_metadata(&self, tokens: &TokenResponse) -> Result<(), SessionError> {
        self.storage.set(TOKEN_TYPE_KEY, &tokens.token_type)?;
        self.storage.set(EXPIRES_IN_KEY, &tokens.expires_in.to_string())?;
        Ok(())
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    // ===== Observable state =====

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.state.borrow().refresh_token.clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }
}

fn read_key(storage: &dyn SessionStorage, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "Failed to read persisted session entry");
            None
        }
    }
}
