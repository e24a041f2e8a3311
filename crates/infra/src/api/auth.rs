//! API authentication
//!
//! Token sources for the three ways a client can authenticate:
//! client-credentials OAuth2 (lazily exchanged, renewed near expiry), a
//! static bearer token, or none at all.

use async_trait::async_trait;
use lookerkit_common::auth::{
    AuthToken, ClientCredentialsConfig, OAuthClient, TokenManager, DEFAULT_EXPIRY_SKEW_SECONDS,
};
use lookerkit_domain::constants::LOGIN_PATH;
use oauth2::AccessToken;
use tracing::debug;
use url::Url;

use super::errors::ApiError;

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token
    ///
    /// This method should handle token refresh if needed.
    async fn access_token(&self) -> Result<String, ApiError>;
}

/// Client-credentials OAuth2 against `<base>/4.0/login`
///
/// Construction performs no I/O. The first authenticated request triggers
/// the exchange, so bad credentials surface from that request.
pub struct ClientCredentialsAuth {
    manager: TokenManager<OAuthClient>,
}

impl ClientCredentialsAuth {
    /// Create the provider for the API rooted at `base_url`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Url` if the login endpoint cannot be resolved
    /// against `base_url`
    pub fn new(
        base_url: &Url,
        client_id: &str,
        client_secret: &str,
        http: reqwest::Client,
    ) -> Result<Self, ApiError> {
        let token_url = base_url.join(LOGIN_PATH)?;
        debug!(%token_url, "configuring client-credentials authentication");

        let config = ClientCredentialsConfig::new(token_url, client_id, client_secret);
        let client = OAuthClient::with_http_client(config, http);
        Ok(Self { manager: TokenManager::new(client, DEFAULT_EXPIRY_SKEW_SECONDS) })
    }
}

#[async_trait]
impl AccessTokenProvider for ClientCredentialsAuth {
    async fn access_token(&self) -> Result<String, ApiError> {
        self.manager
            .access_token()
            .await
            .map_err(|e| ApiError::Auth(format!("client-credentials exchange failed: {e}")))
    }
}

/// Fixed bearer token that is never refreshed
pub struct StaticTokenAuth {
    token: AccessToken,
}

impl StaticTokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: AccessToken::new(token.into()) }
    }
}

impl From<AuthToken> for StaticTokenAuth {
    fn from(token: AuthToken) -> Self {
        Self::new(token.access_token)
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenAuth {
    async fn access_token(&self) -> Result<String, ApiError> {
        Ok(self.token.secret().clone())
    }
}
