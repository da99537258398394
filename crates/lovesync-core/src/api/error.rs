use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - token may be expired or credentials invalid: {payload}")]
    Unauthorized { payload: Value },

    #[error("Access denied: {payload}")]
    AccessDenied { payload: Value },

    #[error("Resource not found: {payload}")]
    NotFound { payload: Value },

    #[error("Rate limited - please wait before retrying")]
    RateLimited { payload: Value },

    #[error("Request rejected (status {status}): {payload}")]
    Rejected { status: u16, payload: Value },

    #[error("Server error (status {status}): {payload}")]
    ServerError { status: u16, payload: Value },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Maximum length for non-JSON error bodies kept in the payload
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
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

    /// The server's error body, parsed as JSON when possible.
    fn parse_payload(body: &str) -> Value {
        if body.trim().is_empty() {
            return Value::Null;
        }
        serde_json::from_str(body).unwrap_or_else(|_| Value::String(Self::truncate_body(body)))
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let payload = Self::parse_payload(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized { payload },
            403 => ApiError::AccessDenied { payload },
            404 => ApiError::NotFound { payload },
            429 => ApiError::RateLimited { payload },
            code @ 500..=599 => ApiError::ServerError { status: code, payload },
            code => ApiError::Rejected { status: code, payload },
        }
    }

    /// The structured error body returned by the server, verbatim.
    ///
    /// `None` when the request never produced a response.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            ApiError::Unauthorized { payload }
            | ApiError::AccessDenied { payload }
            | ApiError::NotFound { payload }
            | ApiError::RateLimited { payload }
            | ApiError::Rejected { payload, .. }
            | ApiError::ServerError { payload, .. } => Some(payload),
            ApiError::NetworkError(_)
            | ApiError::InvalidResponse(_)
            | ApiError::InvalidRequest(_) => None,
        }
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::AccessDenied { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::RateLimited { .. } => Some(429),
            ApiError::Rejected { status, .. } | ApiError::ServerError { status, .. } => {
                Some(*status)
            }
            ApiError::NetworkError(e) => e.status().map(|s| s.as_u16()),
            ApiError::InvalidResponse(_) | ApiError::InvalidRequest(_) => None,
        }
    }

    /// True when the server refused the credential itself (401/403), as
    /// opposed to being unreachable or failing internally.
    pub fn is_credential_rejection(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. } | ApiError::AccessDenied { .. })
    }

    /// Short message suitable for a toast: the server's `detail`/`message`
    /// field when present, else the error's display text.
    pub fn user_message(&self) -> String {
        if let Some(Value::Object(map)) = self.payload() {
            for key in ["detail", "message", "error"] {
                if let Some(Value::String(text)) = map.get(key) {
                    return text.clone();
                }
            }
        }
        match self {
            ApiError::Unauthorized { .. } => "Invalid username or password".to_string(),
            ApiError::NetworkError(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::NetworkError(_) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            other => other.to_string(),
        }
    }
}
