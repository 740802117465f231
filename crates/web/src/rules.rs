//! Route classification rules for the guard

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// How the guard treats a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Requires a verified session
    Private,
    /// Only for visitors without a session (sign-in, sign-up)
    AuthOnly,
    /// Not gated
    Public,
}

/// Static prefix lists and redirect targets used by the guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRules {
    /// Path prefixes that require a verified session
    #[serde(default = "default_private_routes")]
    pub private_routes: Vec<String>,

    /// Path prefixes reserved for anonymous visitors
    #[serde(default = "default_auth_routes")]
    pub auth_routes: Vec<String>,

    /// Prefixes (after the leading `/`) the guard never runs on
    #[serde(default = "default_excluded_prefixes")]
    pub excluded_prefixes: Vec<String>,

    /// Where visitors without a session are sent
    #[serde(default = "default_sign_in_path")]
    pub sign_in_path: String,

    /// Where signed-in visitors are sent from auth routes
    #[serde(default = "default_home_path")]
    pub home_path: String,
}

fn default_private_routes() -> Vec<String> {
    vec!["/profile".to_string(), "/notes".to_string()]
}

fn default_auth_routes() -> Vec<String> {
    vec!["/sign-in".to_string(), "/sign-up".to_string()]
}

fn default_excluded_prefixes() -> Vec<String> {
    vec![
        "api".to_string(),
        "_next/static".to_string(),
        "_next/image".to_string(),
        "favicon.ico".to_string(),
    ]
}

fn default_sign_in_path() -> String {
    "/sign-in".to_string()
}

fn default_home_path() -> String {
    "/".to_string()
}

impl Default for RouteRules {
    fn default() -> Self {
        Self {
            private_routes: default_private_routes(),
            auth_routes: default_auth_routes(),
            excluded_prefixes: default_excluded_prefixes(),
            sign_in_path: default_sign_in_path(),
            home_path: default_home_path(),
        }
    }
}

impl RouteRules {
    /// Load rules from a JSON file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No route rules at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read route rules: {:?}", path))?;
        let rules: RouteRules = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse route rules: {:?}", path))?;
        tracing::info!("Loaded route rules from {:?}", path);
        Ok(rules)
    }

    /// Whether the guard runs on this path at all.
    ///
    /// Excluded entries are prefixes of the path after its leading `/`, so
    /// `/apiary` and `/favicon.ico.bak` are skipped as well.
    pub fn is_guarded(&self, path: &str) -> bool {
        let rest = path.strip_prefix('/').unwrap_or(path);
        !self
            .excluded_prefixes
            .iter()
            .any(|prefix| rest.starts_with(prefix.as_str()))
    }

    /// Classify a path by prefix. Private wins if both lists match.
    pub fn classify(&self, path: &str) -> RouteKind {
        if matches_any(&self.private_routes, path) {
            RouteKind::Private
        } else if matches_any(&self.auth_routes, path) {
            RouteKind::AuthOnly
        } else {
            RouteKind::Public
        }
    }
}

fn matches_any(prefixes: &[String], path: &str) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}
