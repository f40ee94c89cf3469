use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::MarkType;

/// A time window during which one kind of mark is expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "horaInicio", with = "hh_mm")]
    pub start: NaiveTime,
    #[serde(rename = "horaFin", with = "hh_mm")]
    pub end: NaiveTime,
    #[serde(rename = "tipo")]
    pub mark_type: MarkType,
    #[serde(rename = "activo", default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(rename = "fechaCreacion", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl Schedule {
    pub fn window_display(&self) -> String {
        format!("{}-{}", self.start.format(hh_mm::FORMAT), self.end.format(hh_mm::FORMAT))
    }
}

/// Fields a client may set when creating or updating a schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleInput {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "horaInicio", with = "hh_mm")]
    pub start: NaiveTime,
    #[serde(rename = "horaFin", with = "hh_mm")]
    pub end: NaiveTime,
    #[serde(rename = "tipo")]
    pub mark_type: MarkType,
    #[serde(rename = "activo", skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// `HH:mm` on the way out; `HH:mm` or `HH:mm:ss` on the way in.
pub(crate) mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}
