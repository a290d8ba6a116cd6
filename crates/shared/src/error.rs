use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            400 | 409 | 422 => Self::Validation,
            _ => Self::Internal,
        }
    }
}

/// Problem body returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Error)]
#[error("{code:?} ({status}): {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::from_status(status),
            status,
            message: message.into(),
        }
    }

    /// Builds the error from a raw response body, falling back to the body text
    /// when it is not a problem document.
    pub fn from_body(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ProblemDetails>(body) {
            Ok(problem) => match (problem.title, problem.detail.or(problem.message)) {
                (Some(title), Some(detail)) => format!("{title}: {detail}"),
                (Some(title), None) => title,
                (None, Some(detail)) => detail,
                (None, None) => format!("http status {status}"),
            },
            Err(_) if body.trim().is_empty() => format!("http status {status}"),
            Err(_) => body.trim().to_string(),
        };
        Self::new(status, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("{entity} id is immutable once persisted (current {current}, requested {requested})")]
    IdentityImmutable {
        entity: &'static str,
        current: i64,
        requested: i64,
    },
}
