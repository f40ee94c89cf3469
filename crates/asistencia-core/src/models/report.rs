use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{MarkStatus, MarkType};

/// Attendance report filters. Paging travels in the query string; the rest
/// is sent as the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportFilter {
    #[serde(rename = "fechaInicio", skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(rename = "fechaFin", skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(rename = "empleadoId", skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<i64>,
    #[serde(rename = "tipoMarcacion", skip_serializing_if = "Option::is_none")]
    pub mark_type: Option<MarkType>,
    #[serde(skip)]
    pub page: Option<u32>,
    #[serde(skip)]
    pub size: Option<u32>,
}

/// One row of an attendance report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    #[serde(rename = "empleadoNombres", default)]
    pub first_names: String,
    #[serde(rename = "empleadoApellidos", default)]
    pub last_names: String,
    #[serde(rename = "empleadoDni", default)]
    pub dni: String,
    #[serde(rename = "empleadoCargo", default)]
    pub position: Option<String>,
    #[serde(rename = "empleadoArea", default)]
    pub area: Option<String>,
    #[serde(rename = "fechaHora")]
    pub marked_at: NaiveDateTime,
    #[serde(rename = "tipo")]
    pub mark_type: MarkType,
    #[serde(rename = "estado", default)]
    pub status: Option<MarkStatus>,
    #[serde(rename = "observaciones", default)]
    pub notes: Option<String>,
}

/// A page of results in the backend's paging format.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(rename = "totalElements")]
    pub total_elements: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
    pub number: u32,
    pub size: u32,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub last: bool,
}
