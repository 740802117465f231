//! Errors returned by [`crate::NotesClient`]

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single backend call.
///
/// The client never retries or translates these; callers see exactly what the
/// transport or backend reported.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, timeout, ...)
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("Backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The backend answered 2xx but the body did not have the expected shape
    #[error("Malformed response: {0}")]
    Malformed(#[source] serde_json::Error),
}

impl ApiError {
    /// HTTP status reported by the backend, if it answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
