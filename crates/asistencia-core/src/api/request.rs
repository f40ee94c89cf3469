//! Immutable request descriptors and buffered responses.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::MARKING_PATH_SEGMENT;
use super::ApiError;

/// Everything needed to (re)issue one logical backend call.
///
/// The pipeline never mutates a descriptor; replaying after a token refresh
/// sends the same descriptor again with whatever token is current.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter only when a value is present.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to serialize body for {}: {}", self.path, e)))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// True for the public attendance-marking endpoint.
    pub fn is_marking(&self) -> bool {
        self.path.contains(MARKING_PATH_SEGMENT)
    }
}

/// A successful response with its body fully read.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_query_order() {
        let request = ApiRequest::get("/admin/horarios/check-overlap")
            .query("tipo", "ENTRADA")
            .query_opt("excludeId", None::<i64>)
            .query_opt("page", Some(2));
        assert_eq!(
            request.query_pairs(),
            &[
                ("tipo".to_string(), "ENTRADA".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
        assert!(request.body().is_none());
    }

    #[test]
    fn test_marking_detection() {
        assert!(ApiRequest::post("/public/asistencia/marcar").is_marking());
        assert!(!ApiRequest::get("/admin/empleados").is_marking());
    }

    #[test]
    fn test_response_json_error_is_invalid_response() {
        let response = ApiResponse::new(StatusCode::OK, b"not json".to_vec());
        let err = response.json::<serde_json::Value>().expect_err("should fail");
        assert!(matches!(err, ApiError::InvalidResponse(_)));
        assert_eq!(response.text(), "not json");
    }
}
