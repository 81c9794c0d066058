//! Client configuration.
//!
//! Every setting has a default, so `ClientConfig::default()` talks to a
//! backend on `localhost:8000`. [`ClientConfig::from_env`] overrides the
//! defaults from environment variables:
//!
//! | Variable | Field |
//! |---|---|
//! | `EVENTRA_API_URL` | `api_url` |
//! | `EVENTRA_REFRESH_TIMEOUT_SECS` | `refresh_timeout` |
//! | `EVENTRA_REQUEST_TIMEOUT_SECS` | `request_timeout` |
//! | `EVENTRA_TOKEN_FILE` | `token_file` |

use std::path::PathBuf;
use std::time::Duration;

use eventra_session::SessionConfig;

use crate::EventraError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

pub const ENV_API_URL: &str = "EVENTRA_API_URL";
pub const ENV_REFRESH_TIMEOUT: &str = "EVENTRA_REFRESH_TIMEOUT_SECS";
pub const ENV_REQUEST_TIMEOUT: &str = "EVENTRA_REQUEST_TIMEOUT_SECS";
pub const ENV_TOKEN_FILE: &str = "EVENTRA_TOKEN_FILE";

/// Configuration for an [`EventraClient`](crate::EventraClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every endpoint path is joined onto, including the `/api`
    /// prefix.
    pub api_url: String,

    /// Upper bound on one token refresh. See
    /// [`SessionConfig::refresh_timeout`].
    pub refresh_timeout: Duration,

    /// Timeout for each HTTP request. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,

    /// Where tokens are persisted. `None` keeps them in memory only.
    pub token_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            refresh_timeout: SessionConfig::default().refresh_timeout,
            request_timeout: Some(Duration::from_secs(30)),
            token_file: None,
        }
    }
}

impl ClientConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`EventraError::Config`] if a timeout variable is not a
    /// whole number of seconds.
    pub fn from_env() -> Result<Self, EventraError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through
    /// `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EventraError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            config.api_url = url.trim().to_string();
        }
        if let Some(secs) = get(ENV_REFRESH_TIMEOUT) {
            config.refresh_timeout = parse_secs(ENV_REFRESH_TIMEOUT, &secs)?;
        }
        if let Some(secs) = get(ENV_REQUEST_TIMEOUT) {
            let timeout = parse_secs(ENV_REQUEST_TIMEOUT, &secs)?;
            // 0 disables the timeout.
            config.request_timeout = (!timeout.is_zero()).then_some(timeout);
        }
        if let Some(path) = get(ENV_TOKEN_FILE) {
            config.token_file = Some(PathBuf::from(path));
        }
        Ok(config)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            refresh_timeout: self.refresh_timeout,
        }
    }

    /// The server origin media paths (QR codes, banners) are relative to:
    /// the API URL without its trailing `/api` path segment.
    pub fn media_origin(&self) -> String {
        let url = self.api_url.trim_end_matches('/');
        url.strip_suffix("/api")
            .unwrap_or(url)
            .trim_end_matches('/')
            .to_string()
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration, EventraError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| EventraError::Config(format!("{key} must be a number of seconds, got {value:?}")))
}
