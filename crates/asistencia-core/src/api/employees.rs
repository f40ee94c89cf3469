//! Employee administration endpoints (`/admin/empleados`).

use tracing::debug;

use super::{ApiClient, ApiError, ApiRequest};
use crate::models::{Employee, EmployeeInput, Envelope};

const EMPLOYEES_PATH: &str = "/admin/empleados";

impl ApiClient {
    pub async fn list_employees(&self) -> Result<Vec<Employee>, ApiError> {
        let envelope: Envelope<Vec<Employee>> = self.get(EMPLOYEES_PATH).await?;
        let employees = envelope.into_inner();
        debug!(count = employees.len(), "Fetched employees");
        Ok(employees)
    }

    pub async fn get_employee(&self, id: i64) -> Result<Employee, ApiError> {
        let envelope: Envelope<Employee> = self.get(&format!("{}/{}", EMPLOYEES_PATH, id)).await?;
        Ok(envelope.into_inner())
    }

    pub async fn create_employee(&self, employee: &EmployeeInput) -> Result<Employee, ApiError> {
        let envelope: Envelope<Employee> = self.post(EMPLOYEES_PATH, employee).await?;
        Ok(envelope.into_inner())
    }

    pub async fn update_employee(&self, id: i64, employee: &Employee) -> Result<Employee, ApiError> {
        let envelope: Envelope<Employee> = self.put(&format!("{}/{}", EMPLOYEES_PATH, id), employee).await?;
        Ok(envelope.into_inner())
    }

    pub async fn delete_employee(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("{}/{}", EMPLOYEES_PATH, id)).await
    }

    /// Look an employee up by DNI. A 404 means "no such employee".
    pub async fn find_employee_by_dni(&self, dni: &str) -> Result<Option<Employee>, ApiError> {
        let request = ApiRequest::get(format!("{}/buscar/dni/{}", EMPLOYEES_PATH, dni));
        match self.fetch::<Envelope<Employee>>(&request).await {
            Ok(envelope) => Ok(Some(envelope.into_inner())),
            Err(ApiError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
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

    fn ana() -> serde_json::Value {
        json!({"id": 7, "codigoUnico": "EMP-0007", "dni": "12345678", "nombres": "Ana",
               "apellidos": "Quispe", "cargo": "Analista", "area": "Sistemas", "activo": true})
    }

    #[tokio::test]
    async fn test_list_unwraps_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/empleados"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": [ana()], "total": 1})))
            .mount(&server)
            .await;

        let employees = client_for(&server).list_employees().await.expect("list");
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].dni, "12345678");
    }

    #[tokio::test]
    async fn test_create_sends_input() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/empleados"))
            .and(body_json(json!({"dni": "12345678", "nombres": "Ana", "apellidos": "Quispe",
                                  "cargo": "Analista", "area": "Sistemas", "activo": true})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true, "data": ana()})))
            .expect(1)
            .mount(&server)
            .await;

        let input = EmployeeInput {
            dni: "12345678".into(),
            first_names: "Ana".into(),
            last_names: "Quispe".into(),
            position: "Analista".into(),
            area: "Sistemas".into(),
            active: true,
        };
        let created = client_for(&server).create_employee(&input).await.expect("create");
        assert_eq!(created.id, Some(7));
    }

    #[tokio::test]
    async fn test_find_by_dni_maps_not_found_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/empleados/buscar/dni/87654321"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/empleados/buscar/dni/12345678"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ana()))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.find_employee_by_dni("87654321").await.expect("lookup"), None);
        let found = client.find_employee_by_dni("12345678").await.expect("lookup");
        assert_eq!(found.map(|e| e.first_names), Some("Ana".to_string()));
    }
}
