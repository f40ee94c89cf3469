//! Durable key/value storage for the session token pair.
//!
//! This module provides:
//! - `SessionStorage`: the key -> string store the session persists into
//! - `FileStorage`: a JSON map file in the cache directory
//! - `KeyringStorage`: one OS keychain entry per key
//! - `MemoryStorage`: process-local storage for tests and throwaway sessions

pub mod file;
pub mod keychain;
pub mod memory;

use thiserror::Error;

pub use self::file::FileStorage;
pub use self::keychain::KeyringStorage;
pub use self::memory::MemoryStorage;

/// Persisted access token
pub const AUTH_TOKEN_KEY: &str = "auth_token";
/// Persisted refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Persisted user record (JSON)
pub const USER_KEY: &str = "user";
/// Persisted token type, usually `Bearer`
pub const TOKEN_TYPE_KEY: &str = "token_type";
/// Persisted access token lifetime in seconds
pub const EXPIRES_IN_KEY: &str = "expires_in";

/// Every key the session writes, in the order it writes them.
pub const SESSION_KEYS: [&str; 5] = [
    AUTH_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
    USER_KEY,
    TOKEN_TYPE_KEY,
    EXPIRES_IN_KEY,
];

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Could not find {0} directory")]
    NoDirectory(&'static str),
}

/// Key -> string store that survives restarts.
///
/// Implementations must treat removing a missing key as success.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
