use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Server-generated badge code
    #[serde(rename = "codigoUnico", default, skip_serializing_if = "Option::is_none")]
    pub unique_code: Option<String>,
    pub dni: String,
    #[serde(rename = "nombres")]
    pub first_names: String,
    #[serde(rename = "apellidos")]
    pub last_names: String,
    #[serde(rename = "cargo")]
    pub position: String,
    pub area: String,
    #[serde(rename = "activo", default = "default_active")]
    pub active: bool,
    #[serde(rename = "fechaCreacion", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(rename = "fechaActualizacion", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

fn default_active() -> bool {
    true
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_names, self.last_names)
    }
}

/// Fields a client may set when creating an employee.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeInput {
    pub dni: String,
    #[serde(rename = "nombres")]
    pub first_names: String,
    #[serde(rename = "apellidos")]
    pub last_names: String,
    #[serde(rename = "cargo")]
    pub position: String,
    pub area: String,
    #[serde(rename = "activo")]
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_employee() {
        let json = r#"{"id": 7, "codigoUnico": "EMP-0007", "dni": "12345678", "nombres": "Ana María",
            "apellidos": "Quispe Huamán", "cargo": "Analista", "area": "Sistemas", "activo": true,
            "fechaCreacion": "2024-03-01T08:15:30", "fechaActualizacion": null}"#;
        let employee: Employee = serde_json::from_str(json).expect("employee");
        assert_eq!(employee.id, Some(7));
        assert_eq!(employee.unique_code.as_deref(), Some("EMP-0007"));
        assert_eq!(employee.full_name(), "Ana María Quispe Huamán");
        assert!(employee.created_at.is_some());
        assert!(employee.updated_at.is_none());
    }

    #[test]
    fn test_input_uses_backend_field_names() {
        let input = EmployeeInput {
            dni: "12345678".into(),
            first_names: "Ana".into(),
            last_names: "Quispe".into(),
            position: "Analista".into(),
            area: "Sistemas".into(),
            active: true,
        };
        let value = serde_json::to_value(&input).expect("serialize");
        assert_eq!(value["nombres"], "Ana");
        assert_eq!(value["cargo"], "Analista");
        assert_eq!(value["activo"], true);
    }
}
