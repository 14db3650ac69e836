use serde_json::Value;
use thiserror::Error;

use crate::auth::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - please log in again")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    LoginFailed(String),

    #[error("{0}")]
    SignupFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Token store error: {0}")]
    TokenStore(#[from] StoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Maximum length for error response bodies in error messages
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

    /// Pull a human-readable message out of an error body.
    ///
    /// Handles `{"detail": "..."}` and field errors such as
    /// `{"username": ["A user with that username already exists."]}`.
    pub fn error_message(body: &str) -> Option<String> {
        let value: Value = serde_json::from_str(body).ok()?;
        let object = value.as_object()?;

        if let Some(detail) = object.get("detail").and_then(Value::as_str) {
            return Some(detail.to_string());
        }

        object.iter().find_map(|(field, errors)| {
            let message = match errors {
                Value::String(s) => Some(s.as_str()),
                Value::Array(items) => items.iter().find_map(Value::as_str),
                _ => None,
            }?;
            if field == "non_field_errors" {
                Some(message.to_string())
            } else {
                Some(format!("{}: {}", field, message))
            }
        })
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::error_message(body).unwrap_or_else(|| Self::truncate_body(body));
        match status.as_u16() {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }

    /// True when the user has to log in again before retrying
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
