//! notehub-web: Session-verifying route guard and web server for NoteHub.
//!
//! Exposes the guard, the session check and the router so the binary and the
//! integration tests share one wiring.

pub mod app;
pub mod error;
pub mod guard;
pub mod pages;
pub mod rules;
pub mod session;

pub use app::{router, AppState};
pub use guard::{require_session, route_guard, Decision, GuardConfig, RouteGuard};
pub use rules::{RouteKind, RouteRules};
pub use session::{SessionCheck, SessionChecker, SessionError};
