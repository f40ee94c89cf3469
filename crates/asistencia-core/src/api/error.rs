use reqwest::StatusCode;
use thiserror::Error;

/// Fallback when a failed response carries no readable message
pub const UNKNOWN_ERROR_MESSAGE: &str = "Error desconocido";

/// Path segment of the public attendance-marking endpoint. That caller
/// renders its own inline feedback, so most of its failures stay out of the
/// global notification queue.
pub const MARKING_PATH_SEGMENT: &str = "/marcar";

const NETWORK_NOTICE: &str = "Error de conexión. Verifica tu conexión a internet.";
const FORBIDDEN_NOTICE: &str = "No tienes permisos para realizar esta acción";
const NOT_FOUND_NOTICE: &str = "Recurso no encontrado";
const INTERNAL_SERVER_NOTICE: &str = "Error interno del servidor. Por favor, intenta más tarde.";
const SERVER_NOTICE: &str = "Error del servidor. Por favor, intenta más tarde.";

#[derive(Error, Debug)]
pub enum ApiError {
    /// No response reached us: DNS, connect, TLS, timeout.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unauthorized: {}", or_unknown(.message))]
    Unauthorized { message: Option<String> },

    /// 400 and 422
    #[error("Validation error ({status}): {}", or_unknown(.message))]
    Validation { status: u16, message: Option<String> },

    #[error("Access denied: {}", or_unknown(.message))]
    Forbidden { message: Option<String> },

    #[error("Resource not found: {}", or_unknown(.message))]
    NotFound { message: Option<String> },

    #[error("Conflict: {}", or_unknown(.message))]
    Conflict { message: Option<String> },

    #[error("Server error ({status}): {}", or_unknown(.message))]
    Server { status: u16, message: Option<String> },

    #[error("Unexpected status {status}: {}", or_unknown(.message))]
    Unclassified { status: u16, message: Option<String> },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

fn or_unknown(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or(UNKNOWN_ERROR_MESSAGE)
}

/// Maximum length for error response bodies in log lines
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the backend's message out of an error body.
    ///
    /// The backend uses `mensaje` on most endpoints and `message` on the
    /// auth endpoints. Anything unparseable yields `None`.
    pub fn backend_message(body: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        ["mensaje", "message"]
            .iter()
            .filter_map(|field| value.get(field).and_then(|v| v.as_str()))
            .find(|m| !m.is_empty())
            .map(str::to_string)
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = Self::backend_message(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized { message },
            400 | 422 => ApiError::Validation {
                status: status.as_u16(),
                message,
            },
            403 => ApiError::Forbidden { message },
            404 => ApiError::NotFound { message },
            409 => ApiError::Conflict { message },
            code @ 500..=u16::MAX => ApiError::Server { status: code, message },
            code => ApiError::Unclassified { status: code, message },
        }
    }

    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Forbidden { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Conflict { .. } => Some(409),
            ApiError::Validation { status, .. }
            | ApiError::Server { status, .. }
            | ApiError::Unclassified { status, .. } => Some(*status),
            ApiError::InvalidRequest(_) | ApiError::InvalidResponse(_) => None,
        }
    }

    /// Message supplied by the backend, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message }
            | ApiError::Validation { message, .. }
            | ApiError::Forbidden { message }
            | ApiError::NotFound { message }
            | ApiError::Conflict { message }
            | ApiError::Server { message, .. }
            | ApiError::Unclassified { message, .. } => message.as_deref(),
            ApiError::Network(_) | ApiError::InvalidRequest(_) | ApiError::InvalidResponse(_) => None,
        }
    }

    /// Backend message, or the generic fallback. Never empty.
    pub fn message_or_unknown(&self) -> &str {
        self.message().unwrap_or(UNKNOWN_ERROR_MESSAGE)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Text to show in the global notification queue, or `None` when the
    /// failure should stay silent. Marking requests report most failures
    /// inline instead.
    pub fn user_notice(&self, marking: bool) -> Option<String> {
        match self {
            ApiError::Network(_) => Some(NETWORK_NOTICE.to_string()),
            ApiError::Validation { status: 400, .. } if marking => None,
            ApiError::Validation { status: 400, .. } => {
                Some(format!("Error de validación: {}", self.message_or_unknown()))
            }
            ApiError::Validation { .. } => {
                Some(format!("Error de procesamiento: {}", self.message_or_unknown()))
            }
            ApiError::Forbidden { .. } => Some(FORBIDDEN_NOTICE.to_string()),
            ApiError::NotFound { .. } if marking => None,
            ApiError::NotFound { .. } => Some(NOT_FOUND_NOTICE.to_string()),
            ApiError::Conflict { .. } if marking => None,
            ApiError::Conflict { .. } => Some(format!("Conflicto: {}", self.message_or_unknown())),
            ApiError::Server { status: 500, .. } => Some(INTERNAL_SERVER_NOTICE.to_string()),
            ApiError::Server { .. } => Some(SERVER_NOTICE.to_string()),
            ApiError::Unauthorized { .. }
            | ApiError::Unclassified { .. }
            | ApiError::InvalidRequest(_)
            | ApiError::InvalidResponse(_) => None,
        }
    }
}
