//! Route guard middleware
//!
//! Runs once per request inside the guard boundary:
//! - private routes need a session confirmed by the upstream endpoint and fail
//!   closed (any check failure redirects to sign-in);
//! - auth routes send signed-in visitors home and fail open (a flaky check
//!   leaves sign-in reachable);
//! - everything else passes through untouched.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode, Uri,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use cookie::Cookie;
use url::Url;

use crate::rules::{RouteKind, RouteRules};
use crate::session::{SessionCheck, SessionChecker, SessionError, DEFAULT_SESSION_TIMEOUT};

/// Settings for [`RouteGuard`]
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Full URL of the session endpoint
    pub session_url: Url,
    /// Bound on each session check; hitting it counts as a transport failure
    pub timeout: Duration,
    pub rules: RouteRules,
}

impl GuardConfig {
    pub fn new(session_url: Url) -> Self {
        Self {
            session_url,
            timeout: DEFAULT_SESSION_TIMEOUT,
            rules: RouteRules::default(),
        }
    }
}

/// Outcome of the guard for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Hand the request to the next service unchanged
    PassThrough,
    /// Answer with a 307 to `location`, carrying `set_cookies` forward
    Redirect {
        location: String,
        set_cookies: Vec<HeaderValue>,
    },
}

impl Decision {
    fn redirect_to(location: &str) -> Self {
        Decision::Redirect {
            location: location.to_string(),
            set_cookies: Vec::new(),
        }
    }
}

fn redirect_response(location: &str, set_cookies: Vec<HeaderValue>) -> Response {
    let mut response = Redirect::temporary(location).into_response();
    let headers = response.headers_mut();
    for value in set_cookies {
        // One header line per cookie
        headers.append(SET_COOKIE, value);
    }
    response
}

/// Route guard state shared by every request.
#[derive(Debug)]
pub struct RouteGuard {
    rules: RouteRules,
    checker: SessionChecker,
}

impl RouteGuard {
    pub fn new(config: GuardConfig) -> Result<Self, reqwest::Error> {
        let checker = SessionChecker::new(config.session_url, config.timeout)?;
        Ok(Self {
            rules: config.rules,
            checker,
        })
    }

    pub fn rules(&self) -> &RouteRules {
        &self.rules
    }

    /// Decide what to do with a request, calling the session endpoint if needed.
    pub async fn evaluate(&self, uri: &Uri, cookies: Option<&str>) -> Decision {
        let path = uri.path();
        if !self.rules.is_guarded(path) {
            return Decision::PassThrough;
        }

        let kind = self.rules.classify(path);
        if kind == RouteKind::Public {
            return Decision::PassThrough;
        }

        let outcome = self.checker.check(cookies).await;
        if let Err(e) = &outcome {
            tracing::warn!("Session check failed for {} ({:?} route): {}", path, kind, e);
        }

        let decision = decide(kind, outcome, uri, &self.rules);
        tracing::debug!("{} {:?} -> {:?}", path, kind, decision);
        decision
    }
}

/// Map a route kind and session check outcome to a decision.
pub fn decide(
    kind: RouteKind,
    outcome: Result<SessionCheck, SessionError>,
    uri: &Uri,
    rules: &RouteRules,
) -> Decision {
    match kind {
        RouteKind::Public => Decision::PassThrough,
        RouteKind::Private => match outcome {
            Ok(check) if check.valid => {
                if check.set_cookies.is_empty() {
                    Decision::PassThrough
                } else {
                    // Reload the same URL so the browser stores the rotated session first
                    Decision::Redirect {
                        location: same_url(uri),
                        set_cookies: check.set_cookies,
                    }
                }
            }
            _ => Decision::redirect_to(&rules.sign_in_path),
        },
        RouteKind::AuthOnly => match outcome {
            // A rotated session rides along on the redirect home
            Ok(check) if check.valid => Decision::Redirect {
                location: rules.home_path.clone(),
                set_cookies: check.set_cookies,
            },
            _ => Decision::PassThrough,
        },
    }
}

fn same_url(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// Join every cookie on the request into one `Cookie` header value.
///
/// Requests may spread cookies over several `Cookie` headers (HTTP/2 does).
/// Pairs that do not parse are dropped.
pub fn forwarded_cookies(headers: &HeaderMap) -> Option<String> {
    let pairs: Vec<String> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .map(|cookie| format!("{}={}", cookie.name(), cookie.value()))
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

/// Middleware entry point, installed with `axum::middleware::from_fn_with_state`.
///
/// Must wrap the top-level router so `request.uri()` still holds the full path.
pub async fn route_guard(
    State(guard): State<Arc<RouteGuard>>,
    request: Request,
    next: Next,
) -> Response {
    let uri = request.uri().clone();
    let cookies = forwarded_cookies(request.headers());

    match guard.evaluate(&uri, cookies.as_deref()).await {
        Decision::PassThrough => next.run(request).await,
        Decision::Redirect {
            location,
            set_cookies,
        } => redirect_response(&location, set_cookies),
    }
}

/// Middleware for the JSON API: requires a verified session and answers
/// `401 Unauthorized` otherwise. Never redirects.
///
/// A rotated session is handed back on the API response itself.
pub async fn require_session(
    State(guard): State<Arc<RouteGuard>>,
    request: Request,
    next: Next,
) -> Response {
    let cookies = forwarded_cookies(request.headers());

    match guard.checker.check(cookies.as_deref()).await {
        Ok(check) if check.valid => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            for value in check.set_cookies {
                headers.append(SET_COOKIE, value);
            }
            response
        }
        Ok(_) => {
            tracing::debug!("Rejected API request {}: no session", request.uri().path());
            unauthorized("A valid session is required")
        }
        Err(e) => {
            tracing::warn!("Session check failed for API request {}: {}", request.uri().path(), e);
            unauthorized("Session could not be verified")
        }
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized", "message": message })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    fn valid() -> Result<SessionCheck, SessionError> {
        Ok(SessionCheck {
            valid: true,
            set_cookies: Vec::new(),
        })
    }

    fn invalid() -> Result<SessionCheck, SessionError> {
        Ok(SessionCheck::default())
    }

    fn rotated(values: &[&'static str]) -> Result<SessionCheck, SessionError> {
        Ok(SessionCheck {
            valid: true,
            set_cookies: values.iter().map(|&v| HeaderValue::from_static(v)).collect(),
        })
    }

    fn sign_in() -> Decision {
        Decision::redirect_to("/sign-in")
    }

    // ==================== decide: private ====================

    #[test]
    fn test_private_valid_without_cookies_passes() {
        let rules = RouteRules::default();
        let d = decide(RouteKind::Private, valid(), &uri("/notes"), &rules);
        assert_eq!(d, Decision::PassThrough);
    }

    #[test]
    fn test_private_invalid_redirects_to_sign_in() {
        let rules = RouteRules::default();
        let d = decide(RouteKind::Private, invalid(), &uri("/profile"), &rules);
        assert_eq!(d, sign_in());
    }

    #[test]
    fn test_private_failure_redirects_to_sign_in() {
        let rules = RouteRules::default();
        for err in [SessionError::Timeout, SessionError::Status(StatusCode::BAD_GATEWAY)] {
            let d = decide(RouteKind::Private, Err(err), &uri("/notes/123"), &rules);
            assert_eq!(d, sign_in());
        }
    }

    #[test]
    fn test_private_rotated_session_redirects_to_same_url() {
        let rules = RouteRules::default();
        let d = decide(
            RouteKind::Private,
            rotated(&["accessToken=a; Path=/", "refreshToken=r; Path=/; HttpOnly"]),
            &uri("/notes/filter/Work?page=2"),
            &rules,
        );
        assert_eq!(
            d,
            Decision::Redirect {
                location: "/notes/filter/Work?page=2".to_string(),
                set_cookies: vec![
                    HeaderValue::from_static("accessToken=a; Path=/"),
                    HeaderValue::from_static("refreshToken=r; Path=/; HttpOnly"),
                ],
            }
        );
    }

    #[test]
    fn test_custom_sign_in_path() {
        let rules = RouteRules {
            sign_in_path: "/login".into(),
            ..RouteRules::default()
        };
        let d = decide(RouteKind::Private, invalid(), &uri("/notes"), &rules);
        assert_eq!(d, Decision::redirect_to("/login"));
    }

    // ==================== decide: auth-only ====================

    #[test]
    fn test_auth_route_valid_redirects_home() {
        let rules = RouteRules::default();
        let d = decide(RouteKind::AuthOnly, valid(), &uri("/sign-in"), &rules);
        assert_eq!(d, Decision::redirect_to("/"));
    }

    #[test]
    fn test_auth_route_rotated_session_keeps_cookies_on_home_redirect() {
        let rules = RouteRules::default();
        let d = decide(
            RouteKind::AuthOnly,
            rotated(&["accessToken=a; Path=/", "refreshToken=r; Path=/; HttpOnly"]),
            &uri("/sign-in"),
            &rules,
        );
        assert_eq!(
            d,
            Decision::Redirect {
                location: "/".to_string(),
                set_cookies: vec![
                    HeaderValue::from_static("accessToken=a; Path=/"),
                    HeaderValue::from_static("refreshToken=r; Path=/; HttpOnly"),
                ],
            }
        );
    }

    #[test]
    fn test_auth_route_invalid_or_failed_passes() {
        let rules = RouteRules::default();
        assert_eq!(
            decide(RouteKind::AuthOnly, invalid(), &uri("/sign-up"), &rules),
            Decision::PassThrough
        );
        assert_eq!(
            decide(RouteKind::AuthOnly, Err(SessionError::Timeout), &uri("/sign-in"), &rules),
            Decision::PassThrough
        );
    }

    #[test]
    fn test_public_always_passes() {
        let rules = RouteRules::default();
        for outcome in [valid(), invalid(), Err(SessionError::Timeout)] {
            assert_eq!(
                decide(RouteKind::Public, outcome, &uri("/"), &rules),
                Decision::PassThrough
            );
        }
    }

    // ==================== forwarded_cookies ====================

    #[test]
    fn test_forwarded_cookies_none() {
        assert_eq!(forwarded_cookies(&HeaderMap::new()), None);
    }

    #[test]
    fn test_forwarded_cookies_merges_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("accessToken=abc; theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("refreshToken=xyz"));

        assert_eq!(
            forwarded_cookies(&headers).as_deref(),
            Some("accessToken=abc; theme=dark; refreshToken=xyz")
        );
    }

    // ==================== redirect_response ====================

    #[test]
    fn test_redirect_response_keeps_set_cookies_separate() {
        let response = redirect_response(
            "/notes",
            vec![
                HeaderValue::from_static("accessToken=a; Path=/"),
                HeaderValue::from_static("refreshToken=r; Path=/"),
            ],
        );

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/notes");

        let cookies: Vec<_> = response.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies, vec!["accessToken=a; Path=/", "refreshToken=r; Path=/"]);
    }
}
