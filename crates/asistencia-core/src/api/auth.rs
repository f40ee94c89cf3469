use serde::Deserialize;

use super::{ApiClient, ApiError};

#[derive(Debug, Clone, Deserialize)]
pub struct TokenValidation {
    pub valid: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiClient {
    /// Ask the backend whether the current access token is accepted.
    /// Goes through the pipeline, so an expired token is refreshed first.
    pub async fn validate_token(&self) -> Result<TokenValidation, ApiError> {
        self.get("/auth/validate").await
    }
}
