//! Work schedule endpoints (`/admin/horarios`).

use serde::Deserialize;

use super::{ApiClient, ApiError, ApiRequest};
use crate::models::schedule::hh_mm;
use crate::models::{Envelope, Schedule, ScheduleInput};

const SCHEDULES_PATH: &str = "/admin/horarios";

#[derive(Debug, Deserialize)]
struct OverlapResponse {
    #[serde(rename = "hasOverlap")]
    has_overlap: bool,
}

impl ApiClient {
    pub async fn list_schedules(&self) -> Result<Vec<Schedule>, ApiError> {
        let envelope: Envelope<Vec<Schedule>> = self.get(SCHEDULES_PATH).await?;
        Ok(envelope.into_inner())
    }

    pub async fn list_active_schedules(&self) -> Result<Vec<Schedule>, ApiError> {
        let envelope: Envelope<Vec<Schedule>> = self.get(&format!("{}/activos", SCHEDULES_PATH)).await?;
        Ok(envelope.into_inner())
    }

    pub async fn get_schedule(&self, id: i64) -> Result<Schedule, ApiError> {
        let envelope: Envelope<Schedule> = self.get(&format!("{}/{}", SCHEDULES_PATH, id)).await?;
        Ok(envelope.into_inner())
    }

    pub async fn create_schedule(&self, schedule: &ScheduleInput) -> Result<Schedule, ApiError> {
        let envelope: Envelope<Schedule> = self.post(SCHEDULES_PATH, schedule).await?;
        Ok(envelope.into_inner())
    }

    pub async fn update_schedule(&self, id: i64, schedule: &ScheduleInput) -> Result<Schedule, ApiError> {
        let envelope: Envelope<Schedule> = self.put(&format!("{}/{}", SCHEDULES_PATH, id), schedule).await?;
        Ok(envelope.into_inner())
    }

    /// Soft delete: the backend deactivates the schedule.
    pub async fn delete_schedule(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("{}/{}", SCHEDULES_PATH, id)).await
    }

    /// Whether `schedule` would overlap an existing one of the same type.
    /// `exclude_id` skips the schedule being edited.
    pub async fn check_schedule_overlap(
        &self,
        schedule: &ScheduleInput,
        exclude_id: Option<i64>,
    ) -> Result<bool, ApiError> {
        let request = ApiRequest::get(format!("{}/check-overlap", SCHEDULES_PATH))
            .query("tipo", schedule.mark_type)
            .query("horaInicio", schedule.start.format(hh_mm::FORMAT))
            .query("horaFin", schedule.end.format(hh_mm::FORMAT))
            .query_opt("excludeId", exclude_id);
        let response: OverlapResponse = self.fetch(&request).await?;
        Ok(response.has_overlap)
    }
}
