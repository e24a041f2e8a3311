//! OAuth 2.0 client-credentials exchange
//!
//! Posts the client id and secret to the API login endpoint as form
//! parameters and decodes the issued bearer token.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use super::traits::TokenExchange;
use super::types::{AuthToken, ClientCredentialsConfig, OAuthError};

/// Error type for OAuth client operations
#[derive(Debug)]
pub enum OAuthClientError {
    /// HTTP request failed
    RequestFailed(reqwest::Error),

    /// Token endpoint answered with a non-success status
    Rejected { status: StatusCode, error: Option<OAuthError>, body: String },

    /// Failed to parse response
    ParseError(String),

    /// Invalid configuration
    ConfigError(String),
}

impl std::fmt::Display for OAuthClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestFailed(e) => write!(f, "HTTP request failed: {e}"),
            Self::Rejected { status, error: Some(error), .. } => {
                write!(f, "Token request rejected ({status}): {error}")
            }
            Self::Rejected { status, error: None, body } => {
                write!(f, "Token request rejected ({status}): {body}")
            }
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for OAuthClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RequestFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OAuthClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestFailed(err)
    }
}

/// OAuth 2.0 client for the client-credentials grant
///
/// Credentials travel in the request body (`client_id`, `client_secret`
/// params), never in a basic-auth header.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: ClientCredentialsConfig,
    client: Client,
}

impl OAuthClient {
    /// Create a new OAuth client with the given configuration
    ///
    /// # Examples
    /// ```
    /// use lookerkit_common::auth::{ClientCredentialsConfig, OAuthClient};
    /// use url::Url;
    ///
    /// let url = Url::parse("https://acme.example.com/api/4.0/login").unwrap();
    /// let client = OAuthClient::new(ClientCredentialsConfig::new(url, "id", "secret"));
    /// assert_eq!(client.config().client_id(), "id");
    /// ```
    #[must_use]
    pub fn new(config: ClientCredentialsConfig) -> Self {
        Self::with_http_client(config, Client::new())
    }

    /// Create an OAuth client reusing an existing HTTP connection pool
    #[must_use]
    pub fn with_http_client(config: ClientCredentialsConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Exchange the configured credentials for a bearer token
    ///
    /// # Errors
    /// Returns error if the request fails, the server rejects the
    /// credentials, or the token payload cannot be parsed
    pub async fn exchange_client_credentials(&self) -> Result<AuthToken, OAuthClientError> {
        if self.config.client_id().is_empty() {
            return Err(OAuthClientError::ConfigError("client_id is empty".to_string()));
        }

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id()),
            ("client_secret", self.config.client_secret()),
        ];

        debug!(token_url = %self.config.token_url(), "requesting client-credentials token");
        let response =
            self.client.post(self.config.token_url().clone()).form(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = serde_json::from_str::<OAuthError>(&body).ok();
            warn!(status = status.as_u16(), "token endpoint rejected client credentials");
            return Err(OAuthClientError::Rejected { status, error, body });
        }

        let mut token: AuthToken =
            response.json().await.map_err(|e| OAuthClientError::ParseError(e.to_string()))?;
        token.stamp_expiry();

        info!(expires_in = token.expires_in, "obtained client-credentials token");
        Ok(token)
    }

    /// Get a reference to the OAuth configuration
    #[must_use]
    pub fn config(&self) -> &ClientCredentialsConfig {
        &self.config
    }
}

#[async_trait]
impl TokenExchange for OAuthClient {
    async fn exchange(&self) -> Result<AuthToken, OAuthClientError> {
        self.exchange_client_credentials().await
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::client.
    use url::Url;

    use super::*;

    fn config(client_id: &str) -> ClientCredentialsConfig {
        let url = Url::parse("http://127.0.0.1:9/api/4.0/login").unwrap();
        ClientCredentialsConfig::new(url, client_id, "secret")
    }

    #[tokio::test]
    async fn test_empty_client_id_is_config_error() {
        let client = OAuthClient::new(config("  ''  "));

        let err = client.exchange_client_credentials().await.unwrap_err();
        assert!(matches!(err, OAuthClientError::ConfigError(_)));
    }

    #[test]
    fn test_rejected_display_prefers_oauth_error() {
        let err = OAuthClientError::Rejected {
            status: StatusCode::UNAUTHORIZED,
            error: Some(OAuthError {
                error: "invalid_client".to_string(),
                error_description: None,
            }),
            body: "ignored".to_string(),
        };
        assert_eq!(err.to_string(), "Token request rejected (401 Unauthorized): invalid_client");

        let err = OAuthClientError::Rejected {
            status: StatusCode::FORBIDDEN,
            error: None,
            body: "nope".to_string(),
        };
        assert_eq!(err.to_string(), "Token request rejected (403 Forbidden): nope");
    }
}
