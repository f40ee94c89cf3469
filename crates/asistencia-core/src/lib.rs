//! Core library for the asistencia attendance client.
//!
//! This crate provides:
//! - `ApiClient`: the request pipeline every backend call goes through
//! - `SessionStore`: token pair ownership, login/logout/refresh
//! - `NotificationQueue`: transient, auto-expiring user messages
//! - Typed models and endpoint helpers for employees, schedules,
//!   attendance marking and reports
//!
//! The binary crate constructs one `SessionStore` and one
//! `NotificationQueue` at startup and hands them to the `ApiClient`.

pub mod api;
pub mod config;
pub mod models;
pub mod notifications;
pub mod session;
pub mod storage;

pub use api::{ApiClient, ApiError, ApiRequest, ApiResponse, ExportFormat};
pub use config::{Config, StorageKind};
pub use notifications::{Notification, NotificationKind, NotificationQueue, NotifyOptions};
pub use session::{AuthBackend, HttpAuthBackend, SessionError, SessionState, SessionStore, User};
pub use storage::{FileStorage, KeyringStorage, MemoryStorage, SessionStorage, StorageError};
