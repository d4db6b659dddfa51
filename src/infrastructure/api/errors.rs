use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to the admin backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// 401 that could not be recovered by a token refresh
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Refresh failed for a session that held a token; the session was cleared
    #[error("Session expired - please log in again")]
    SessionExpired,

    /// Any other 4xx (400, 409, 422, 429, ...) with the backend's message verbatim
    #[error("{message}")]
    Validation { status: StatusCode, message: String },

    /// Forbidden - permission denied (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server error (HTTP 5xx)
    #[error("Server error ({0}): {1}")]
    ServerError(StatusCode, String),

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// The request was aborted through its cancellation token
    #[error("Request cancelled")]
    Cancelled,

    /// Request could not be built (bad header, bad URL)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown or unexpected status
    #[error("Unknown error ({0}): {1}")]
    UnknownError(StatusCode, String),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Backend message from a JSON error body, or the raw body.
pub(crate) fn backend_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| body.to_string())
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::NetworkError(err)
        }
    }
}

impl ApiError {
    /// Classify a non-success response.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = backend_message(body);
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            status if status.is_client_error() => Self::Validation { status, message },
            status if status.is_server_error() => Self::ServerError(status, message),
            _ => Self::UnknownError(status, message),
        }
    }

    /// Aborted on purpose; callers drop these silently.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::SessionExpired)
    }

    /// HTTP status behind the error, when there was a response.
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            Self::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            Self::NotFound(_) => Some(StatusCode::NOT_FOUND),
            Self::Validation { status, .. }
            | Self::ServerError(status, _)
            | Self::UnknownError(status, _) => Some(*status),
            _ => None,
        }
    }
}
