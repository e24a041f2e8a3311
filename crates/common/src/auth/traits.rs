//! Traits for OAuth operations
//!
//! Abstracts the token endpoint so the token lifecycle can be tested with
//! mock implementations.

use async_trait::async_trait;

use super::client::OAuthClientError;
use super::types::AuthToken;

/// Source of freshly minted access tokens
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Obtain a new token from the authorization server
    ///
    /// # Errors
    /// Returns error if the request fails, the server rejects the
    /// credentials, or the response cannot be parsed
    async fn exchange(&self) -> Result<AuthToken, OAuthClientError>;
}
