//! Attendance reports and exports (`/admin/reportes`).

use std::fmt;

use tracing::debug;

use super::{ApiClient, ApiError, ApiRequest};
use crate::models::{AttendanceRecord, Page, ReportFilter};

const REPORTS_PATH: &str = "/admin/reportes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Excel,
    Pdf,
}

impl ExportFormat {
    fn path_segment(&self) -> &'static str {
        match self {
            ExportFormat::Excel => "excel",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Conventional file extension for the exported document.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Excel => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl ApiClient {
    /// One page of attendance records matching `filter`.
    pub async fn attendance_report(&self, filter: &ReportFilter) -> Result<Page<AttendanceRecord>, ApiError> {
        let request = ApiRequest::post(format!("{}/asistencias", REPORTS_PATH))
            .query_opt("page", filter.page)
            .query_opt("size", filter.size)
            .json(filter)?;
        let page: Page<AttendanceRecord> = self.fetch(&request).await?;
        debug!(
            rows = page.content.len(),
            total = page.total_elements,
            page = page.number,
            "Fetched attendance report"
        );
        Ok(page)
    }

    /// The backend-rendered report document. Paging is ignored.
    pub async fn export_report(&self, filter: &ReportFilter, format: ExportFormat) -> Result<Vec<u8>, ApiError> {
        let request = ApiRequest::post(format!("{}/export/{}", REPORTS_PATH, format.path_segment())).json(filter)?;
        let response = self.execute(&request).await?;
        debug!(format = %format, bytes = response.bytes().len(), "Exported report");
        Ok(response.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::Config;
    use crate::notifications::NotificationQueue;
    use crate::storage::MemoryStorage;

    fn client_for(server: &MockServer) -> ApiClient {
        let config = Config {
            base_url: server.uri(),
            ..Config::default()
        };
        ApiClient::connect(&config, Arc::new(MemoryStorage::new()), NotificationQueue::new()).expect("client")
    }

    fn may_2024() -> ReportFilter {
        ReportFilter {
            from: NaiveDate::from_ymd_opt(2024, 5, 1),
            to: NaiveDate::from_ymd_opt(2024, 5, 31),
            ..ReportFilter::default()
        }
    }

    #[tokio::test]
    async fn test_report_paging_goes_in_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/reportes/asistencias"))
            .and(query_param("page", "2"))
            .and(query_param("size", "10"))
            .and(body_json(json!({"fechaInicio": "2024-05-01", "fechaFin": "2024-05-31"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [], "totalElements": 20, "totalPages": 2, "number": 2, "size": 10,
                "first": false, "last": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let filter = ReportFilter {
            page: Some(2),
            size: Some(10),
            ..may_2024()
        };
        let page = client_for(&server).attendance_report(&filter).await.expect("report");
        assert!(page.last);
        assert!(page.content.is_empty());
    }

    #[tokio::test]
    async fn test_export_returns_raw_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/reportes/export/pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7 fake".to_vec()))
            .mount(&server)
            .await;

        let bytes = client_for(&server)
            .export_report(&may_2024(), ExportFormat::Pdf)
            .await
            .expect("export");
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(ExportFormat::Excel.extension(), "xlsx");
    }
}
