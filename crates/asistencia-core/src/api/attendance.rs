//! Public kiosk attendance marking.
//!
//! Failures on this endpoint (unknown DNI, duplicate mark, malformed DNI)
//! are not pushed to the notification queue; callers render them inline
//! from the returned error's message.

use tracing::info;

use super::{ApiClient, ApiError};
use crate::models::{MarkRequest, MarkResponse};

const MARK_PATH: &str = "/public/asistencia/marcar";

impl ApiClient {
    pub async fn mark_attendance(&self, dni: &str) -> Result<MarkResponse, ApiError> {
        let request = MarkRequest { dni: dni.to_string() };
        let response: MarkResponse = self.post(MARK_PATH, &request).await?;
        info!(
            mark_type = ?response.mark_type,
            status = ?response.status,
            "Attendance marked"
        );
        Ok(response)
    }
}
