//! OAuth 2.0 types and structures
//!
//! Token payloads returned by the login endpoints and the configuration for
//! the client-credentials grant.

use std::fmt;

use chrono::{DateTime, Utc};
use oauth2::{ClientId, ClientSecret, TokenUrl};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::utils::serde::null_as_default;

/// Bearer token issued by the API login endpoints
///
/// Both `POST 4.0/login` (client credentials) and `POST 4.0/login/{user_id}`
/// (impersonation) answer with this shape.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthToken {
    /// Opaque access token sent as `Authorization: Bearer <token>`
    pub access_token: String,

    /// Token type, "Bearer" in practice; missing, `null` or empty reads as
    /// "Bearer"
    #[serde(default = "default_token_type", deserialize_with = "token_type_or_bearer")]
    pub token_type: String,

    /// Access token lifetime in seconds. Zero or negative means the server
    /// gave no expiry hint.
    #[serde(default, deserialize_with = "null_as_default")]
    pub expires_in: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Absolute expiration timestamp (UTC), stamped locally from
    /// `expires_in` when the token is received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

fn token_type_or_bearer<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|token_type| !token_type.is_empty())
        .unwrap_or_else(default_token_type))
}

impl AuthToken {
    /// Create a bearer token with a calculated expiration time
    #[must_use]
    pub fn new(access_token: impl Into<String>, expires_in: i64) -> Self {
        let mut token = Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            expires_in,
            refresh_token: None,
            expires_at: None,
        };
        token.stamp_expiry();
        token
    }

    /// Recalculate `expires_at` from `expires_in` relative to now
    pub fn stamp_expiry(&mut self) {
        self.expires_at = if self.expires_in > 0 {
            Some(Utc::now() + chrono::Duration::seconds(self.expires_in))
        } else {
            None
        };
    }

    /// Check if the access token is expired or will expire within the given
    /// threshold
    ///
    /// # Returns
    /// `true` if the token is expired or will expire within the threshold,
    /// `false` if it's still valid beyond the threshold or if no expiry is set
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                Utc::now() + chrono::Duration::seconds(threshold_seconds) >= expires_at
            }
            None => false,
        }
    }

    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - Utc::now()).num_seconds())
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("access_token", &"[redacted]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Strip surrounding whitespace and quote characters from a credential.
///
/// Credentials copied out of shell profiles or config files frequently keep
/// their quotes.
#[must_use]
pub fn trim_credential(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '\'' || c == '"').trim()
}

/// Client-credentials grant configuration
#[derive(Debug, Clone)]
pub struct ClientCredentialsConfig {
    token_url: TokenUrl,
    client_id: ClientId,
    client_secret: ClientSecret,
}

impl ClientCredentialsConfig {
    /// Create a configuration, trimming quotes and whitespace from the
    /// supplied credentials
    #[must_use]
    pub fn new(token_url: Url, client_id: &str, client_secret: &str) -> Self {
        Self {
            token_url: TokenUrl::from_url(token_url),
            client_id: ClientId::new(trim_credential(client_id).to_string()),
            client_secret: ClientSecret::new(trim_credential(client_secret).to_string()),
        }
    }

    #[must_use]
    pub fn token_url(&self) -> &Url {
        self.token_url.url()
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        self.client_id.as_str()
    }

    #[must_use]
    pub fn client_secret(&self) -> &str {
        self.client_secret.secret()
    }
}

/// OAuth error response from authorization server
///
/// Standard OAuth 2.0 error response format (RFC 6749 §5.2).
#[derive(Debug, Deserialize)]
pub struct OAuthError {
    pub error: String,
    pub error_description: Option<String>,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthError {}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::types.
    use super::*;

    #[test]
    fn test_auth_token_deserializes_login_payload() {
        let json = r#"{"access_token":"abc","token_type":"Bearer","expires_in":3600}"#;
        let mut token: AuthToken = serde_json::from_str(json).unwrap();
        token.stamp_expiry();

        assert_eq!(token.access_token, "abc");
        assert_eq!(token.token_type, "Bearer");
        assert!(token.refresh_token.is_none());
        assert!(token.expires_at.is_some());
    }

    #[test]
    fn test_auth_token_defaults_missing_fields() {
        let token: AuthToken = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();

        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 0);
    }

    #[test]
    fn test_auth_token_accepts_null_fields() {
        let json = r#"{"access_token":"abc","token_type":null,"expires_in":null,"refresh_token":null}"#;
        let token: AuthToken = serde_json::from_str(json).unwrap();

        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 0);
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn test_token_expiry_check() {
        let token = AuthToken::new("access", 3600);

        assert!(!token.is_expired(300));
        assert!(token.is_expired(7200));
    }

    #[test]
    fn test_token_without_expiry_never_expires() {
        let token = AuthToken::new("access", 0);

        assert!(!token.is_expired(300));
        assert!(token.seconds_until_expiry().is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut token = AuthToken::new("super-secret", 60);
        token.refresh_token = Some("also-secret".to_string());

        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("also-secret"));
    }

    #[test]
    fn test_trim_credential() {
        assert_eq!(trim_credential("  'abc'  "), "abc");
        assert_eq!(trim_credential("\"abc\""), "abc");
        assert_eq!(trim_credential("abc"), "abc");
        assert_eq!(trim_credential("' '"), "");
    }

    #[test]
    fn test_client_credentials_config_trims() {
        let url = Url::parse("https://x.example.com/api/4.0/login").unwrap();
        let config = ClientCredentialsConfig::new(url, " 'id' ", "\"secret\"\n");

        assert_eq!(config.client_id(), "id");
        assert_eq!(config.client_secret(), "secret");
        assert_eq!(config.token_url().as_str(), "https://x.example.com/api/4.0/login");
    }

    #[test]
    fn test_oauth_error_display() {
        let error = OAuthError {
            error: "invalid_client".to_string(),
            error_description: Some("bad secret".to_string()),
        };
        assert_eq!(error.to_string(), "invalid_client: bad secret");
    }
}
