//! Client configuration

use std::time::Duration;

use url::Url;

/// Environment variable holding the notes backend base URL.
pub const BASE_URL_ENV: &str = "NOTEHUB_URL";

/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "NOTEHUB_TOKEN";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`crate::NotesClient`].
///
/// Only constructible through [`ClientConfig::new`] or [`ClientConfig::from_env`],
/// so the base URL always accepts path segments and the token is never blank.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the notes backend (e.g. `https://notehub-public.goit.study/api`)
    pub(crate) base_url: Url,
    /// Bearer token sent with every request
    pub(crate) token: String,
    /// Per-request timeout
    pub(crate) timeout: Duration,
}

impl ClientConfig {
    /// Build a configuration from a base URL string and a token.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl(base_url.to_string(), e))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::NotABase(base_url.to_string()));
        }

        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::EmptyToken);
        }

        Ok(Self {
            base_url,
            token,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `NOTEHUB_URL`: Base URL of the notes backend
    /// - `NOTEHUB_TOKEN`: Bearer token for the backend
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var(BASE_URL_ENV).map_err(|_| ConfigError::Missing(BASE_URL_ENV))?;
        let token = std::env::var(TOKEN_ENV).map_err(|_| ConfigError::Missing(TOKEN_ENV))?;
        Self::new(&base_url, token)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("Invalid base URL {0:?}: {1}")]
    InvalidBaseUrl(String, #[source] url::ParseError),

    #[error("Base URL cannot carry path segments: {0}")]
    NotABase(String),

    #[error("Bearer token is empty")]
    EmptyToken,

    #[error("Bearer token is not a valid header value")]
    InvalidToken,

    #[error("Failed to build HTTP client: {0}")]
    Http(#[source] reqwest::Error),
}
