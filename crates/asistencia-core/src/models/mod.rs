//! Data models for asistencia entities.
//!
//! This module contains the data structures exchanged with the backend:
//!
//! - `Employee`, `EmployeeInput`: staff records
//! - `Schedule`, `ScheduleInput`: work schedule windows per mark type
//! - `MarkRequest`, `MarkResponse`, `MarkType`, `MarkStatus`: kiosk marking
//! - `ReportFilter`, `AttendanceRecord`, `Page`: attendance reports

pub mod attendance;
pub mod employee;
pub mod report;
pub mod schedule;

use serde::Deserialize;

pub use attendance::{EmployeeSummary, MarkRequest, MarkResponse, MarkStatus, MarkType};
pub use employee::{Employee, EmployeeInput};
pub use report::{AttendanceRecord, Page, ReportFilter};
pub use schedule::{Schedule, ScheduleInput};

/// Most admin endpoints wrap their payload as `{ success, data, ... }`;
/// a few return it bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(data) => data,
        }
    }
}
