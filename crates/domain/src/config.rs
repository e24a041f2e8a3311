//! Client configuration structures
//!
//! The configuration surface of the API client: where the instance lives,
//! how to authenticate, and how requests are decorated and paced.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use lookerkit_common::duration_millis;
use serde::{Deserialize, Serialize};

use crate::errors::{LookerkitError, Result};
use crate::utils::base_url::normalize_base_url;

/// Default spacing between outbound requests
pub const DEFAULT_RATE_LIMIT_INTERVAL: Duration = Duration::from_millis(1000);

fn default_rate_limit_interval() -> Duration {
    DEFAULT_RATE_LIMIT_INTERVAL
}

/// Connection settings for one API client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Instance URL; normalized to end in `/api/` before use
    pub base_url: String,

    /// Credentials; `None` builds an unauthenticated client
    #[serde(default)]
    pub auth: Option<AuthConfig>,

    /// Product token prepended to the library's own user agent
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Static headers added to every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(
        default = "default_rate_limit_interval",
        rename = "rate_limit_interval_ms",
        with = "duration_millis"
    )]
    pub rate_limit_interval: Duration,

    /// Optional per-request timeout; the client enforces none by default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Create a configuration with defaults for everything but the URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth: None,
            user_agent: None,
            headers: BTreeMap::new(),
            rate_limit_interval: DEFAULT_RATE_LIMIT_INTERVAL,
            timeout_secs: None,
        }
    }

    #[must_use]
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// The base URL with the API root segment appended where missing
    #[must_use]
    pub fn normalized_base_url(&self) -> String {
        normalize_base_url(&self.base_url)
    }

    /// Check that required fields are present
    ///
    /// # Errors
    /// Returns `LookerkitError::Config` for an empty base URL or empty
    /// credentials.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(LookerkitError::Config("base_url must not be empty".to_string()));
        }
        match &self.auth {
            Some(AuthConfig::ClientCredentials { client_id, client_secret }) => {
                if client_id.trim().is_empty() || client_secret.trim().is_empty() {
                    return Err(LookerkitError::Config(
                        "client_id and client_secret must not be empty".to_string(),
                    ));
                }
            }
            Some(AuthConfig::StaticToken { access_token }) => {
                if access_token.trim().is_empty() {
                    return Err(LookerkitError::Config("no token provided".to_string()));
                }
            }
            None => {}
        }
        Ok(())
    }
}

/// How the client authenticates
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// OAuth2 client-credentials exchange at `<base>/4.0/login`
    ClientCredentials { client_id: String, client_secret: String },
    /// Pre-obtained bearer token, never refreshed
    StaticToken { access_token: String },
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"[redacted]")
                .finish(),
            Self::StaticToken { .. } => {
                f.debug_struct("StaticToken").field("access_token", &"[redacted]").finish()
            }
        }
    }
}
