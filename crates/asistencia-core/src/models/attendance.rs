use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Which punch of the working day a mark represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkType {
    #[serde(rename = "ENTRADA")]
    CheckIn,
    #[serde(rename = "SALIDA_ALMUERZO")]
    LunchOut,
    #[serde(rename = "RETORNO_ALMUERZO")]
    LunchReturn,
    #[serde(rename = "SALIDA")]
    CheckOut,
    #[serde(rename = "FUERA_HORARIO")]
    OutOfSchedule,
}

impl MarkType {
    pub const ALL: [MarkType; 5] = [
        MarkType::CheckIn,
        MarkType::LunchOut,
        MarkType::LunchReturn,
        MarkType::CheckOut,
        MarkType::OutOfSchedule,
    ];

    /// Wire name, as used in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkType::CheckIn => "ENTRADA",
            MarkType::LunchOut => "SALIDA_ALMUERZO",
            MarkType::LunchReturn => "RETORNO_ALMUERZO",
            MarkType::CheckOut => "SALIDA",
            MarkType::OutOfSchedule => "FUERA_HORARIO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for MarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkStatus {
    #[serde(rename = "PUNTUAL")]
    OnTime,
    #[serde(rename = "TARDANZA")]
    Late,
    #[serde(rename = "FUERA_HORARIO")]
    OutOfSchedule,
}

impl fmt::Display for MarkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MarkStatus::OnTime => "PUNTUAL",
            MarkStatus::Late => "TARDANZA",
            MarkStatus::OutOfSchedule => "FUERA_HORARIO",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkRequest {
    pub dni: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmployeeSummary {
    #[serde(rename = "nombres")]
    pub first_names: String,
    #[serde(rename = "apellidos")]
    pub last_names: String,
}

/// Result of a kiosk mark. Failed marks arrive as error statuses instead.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkResponse {
    pub success: bool,
    #[serde(rename = "mensaje", default)]
    pub message: String,
    #[serde(rename = "empleado", default)]
    pub employee: Option<EmployeeSummary>,
    #[serde(rename = "tipo", default)]
    pub mark_type: Option<MarkType>,
    #[serde(rename = "estado", default)]
    pub status: Option<MarkStatus>,
    #[serde(rename = "fechaHora", default)]
    pub marked_at: Option<NaiveDateTime>,
    #[serde(rename = "observaciones", default)]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mark_response() {
        let json = r#"{"success": true, "mensaje": "Entrada registrada",
            "empleado": {"id": 3, "dni": "12345678", "nombres": "Luis", "apellidos": "Rojas"},
            "tipo": "ENTRADA", "estado": "TARDANZA", "fechaHora": "2024-05-06T08:21:04.123"}"#;
        let response: MarkResponse = serde_json::from_str(json).expect("mark response");
        assert!(response.success);
        assert_eq!(response.mark_type, Some(MarkType::CheckIn));
        assert_eq!(response.status, Some(MarkStatus::Late));
        assert_eq!(response.employee.map(|e| e.first_names), Some("Luis".to_string()));
        assert!(response.marked_at.is_some());
    }

    #[test]
    fn test_parse_failed_mark_response() {
        let response: MarkResponse =
            serde_json::from_str(r#"{"success": false, "mensaje": "Ya existe una marcación reciente"}"#)
                .expect("mark response");
        assert!(!response.success);
        assert!(response.employee.is_none());
    }

    #[test]
    fn test_mark_type_wire_names() {
        for mark_type in MarkType::ALL {
            let json = serde_json::to_string(&mark_type).expect("serialize");
            assert_eq!(json, format!("\"{}\"", mark_type.as_str()));
            assert_eq!(MarkType::parse(mark_type.as_str()), Some(mark_type));
        }
        assert_eq!(MarkType::parse("salida_almuerzo"), Some(MarkType::LunchOut));
        assert_eq!(MarkType::parse("DESCANSO"), None);
    }
}
