//! Live session verification against the upstream auth endpoint
//!
//! The guard never interprets cookies itself. It forwards them to
//! `GET {session_url}` and trusts the `{ "success": bool }` answer, keeping any
//! `Set-Cookie` headers the endpoint issues so a rotated session can be handed
//! back to the browser.

use std::time::Duration;

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderValue, StatusCode,
};
use reqwest::redirect::Policy;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Default bound on a single session check
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session check timed out")]
    Timeout,

    #[error("Session endpoint unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Session endpoint returned {0}")]
    Status(StatusCode),

    #[error("Malformed session response: {0}")]
    Malformed(#[source] serde_json::Error),
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SessionError::Timeout
        } else {
            SessionError::Transport(err)
        }
    }
}

/// Answer from the session endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCheck {
    /// `success` field of the response body
    pub valid: bool,
    /// Every `Set-Cookie` header on the response, in order
    pub set_cookies: Vec<HeaderValue>,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    success: bool,
}

/// Calls the upstream session endpoint.
#[derive(Debug, Clone)]
pub struct SessionChecker {
    http: reqwest::Client,
    endpoint: Url,
}

impl SessionChecker {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        // Redirects are not followed so Set-Cookie is read from the endpoint itself
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Ask the endpoint whether the forwarded cookies belong to a live session.
    pub async fn check(&self, cookies: Option<&str>) -> Result<SessionCheck, SessionError> {
        let mut request = self.http.get(self.endpoint.clone());
        if let Some(cookies) = cookies {
            request = request.header(COOKIE, cookies);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Status(status));
        }

        let set_cookies: Vec<HeaderValue> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .cloned()
            .collect();

        let bytes = response.bytes().await?;
        let body: SessionResponse =
            serde_json::from_slice(&bytes).map_err(SessionError::Malformed)?;

        tracing::debug!(
            "Session check: success={}, {} Set-Cookie header(s)",
            body.success,
            set_cookies.len()
        );

        Ok(SessionCheck {
            valid: body.success,
            set_cookies,
        })
    }
}

/// `{base}/auth/session`
pub fn session_url_for(base: &Url) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(["auth", "session"]);
    }
    url
}
