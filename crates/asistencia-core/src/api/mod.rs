//! REST API client module for the asistencia backend.
//!
//! This module provides the `ApiClient` request pipeline plus typed helpers
//! for the employee, schedule, attendance-marking and report endpoints.
//!
//! The API uses JWT bearer token authentication obtained through the
//! `/auth/login` endpoint and renewed through `/auth/refresh`.

pub mod attendance;
pub mod auth;
pub mod client;
pub mod employees;
pub mod error;
pub mod reports;
pub mod request;
pub mod schedules;

pub use auth::TokenValidation;
pub use client::{ApiClient, SESSION_EXPIRED_NOTICE};
pub use error::ApiError;
pub use reports::ExportFormat;
pub use request::{ApiRequest, ApiResponse};
