//! Session lifecycle: the access/refresh token pair and the current user.
//!
//! This module provides:
//! - `SessionStore`: login, logout, silent refresh and startup initialization
//! - `AuthBackend`: the credential exchange and refresh calls it depends on
//!
//! The store persists its token pair through a `SessionStorage` so a session
//! survives restarts.

pub mod backend;
pub mod store;

use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

pub use backend::{AuthBackend, Credentials, HttpAuthBackend, TokenResponse};
pub use store::{SessionState, SessionStore, User};

/// Shown when a login fails without a backend-supplied reason
pub const LOGIN_FALLBACK_MESSAGE: &str = "Error de autenticación";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No refresh token available")]
    MissingRefreshToken,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to persist session: {0}")]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Message suitable for a login form: the backend's own text when it
    /// sent one, otherwise a generic authentication failure.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Api(e) => e.message().unwrap_or(LOGIN_FALLBACK_MESSAGE).to_string(),
            _ => LOGIN_FALLBACK_MESSAGE.to_string(),
        }
    }
}
