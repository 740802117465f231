//! Mapping of notes backend failures onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use notehub_client::ApiError;
use serde::Serialize;

/// A failed backend call, rendered for the browser.
///
/// Backend statuses are relayed as-is; failures with no backend status become
/// `502 Bad Gateway`.
#[derive(Debug)]
pub struct UpstreamError(pub ApiError);

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl From<ApiError> for UpstreamError {
    fn from(err: ApiError) -> Self {
        UpstreamError(err)
    }
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self.0 {
            ApiError::Status { status, body } => {
                tracing::debug!("Relaying backend status {}", status);
                (status, "backend_error", body)
            }
            ApiError::Transport(e) => {
                tracing::error!("Notes backend unreachable: {}", e);
                (StatusCode::BAD_GATEWAY, "backend_unreachable", e.to_string())
            }
            ApiError::Malformed(e) => {
                tracing::error!("Notes backend sent a malformed response: {}", e);
                (StatusCode::BAD_GATEWAY, "malformed_response", e.to_string())
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_status_is_relayed() {
        let err = UpstreamError(ApiError::Status {
            status: StatusCode::NOT_FOUND,
            body: "Note not found".into(),
        });
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_malformed_is_bad_gateway() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = UpstreamError(ApiError::Malformed(parse_err));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
