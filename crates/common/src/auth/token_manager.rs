//! Token manager with lazy acquisition
//!
//! Manages the bearer token lifecycle:
//! - No network traffic until the first caller asks for a token
//! - Cached token reused until it is within the expiry skew
//! - Re-exchange of client credentials once the token goes stale

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::client::OAuthClientError;
use super::traits::TokenExchange;
use super::types::AuthToken;

/// Seconds before `expires_at` at which a cached token is treated as stale
pub const DEFAULT_EXPIRY_SKEW_SECONDS: i64 = 10;

/// Lazily populated, self-renewing token cache
///
/// The cache is guarded by an async mutex held across the exchange, so
/// concurrent first callers wait for a single exchange instead of each
/// starting their own.
pub struct TokenManager<E: TokenExchange + 'static> {
    exchange: Arc<E>,
    current: Mutex<Option<AuthToken>>,
    expiry_skew_seconds: i64,
}

impl<E: TokenExchange + 'static> TokenManager<E> {
    /// Create a new token manager
    ///
    /// # Arguments
    /// * `exchange` - Token source used for the initial and renewed tokens
    /// * `expiry_skew_seconds` - Renew tokens this many seconds before expiry
    #[must_use]
    pub fn new(exchange: E, expiry_skew_seconds: i64) -> Self {
        Self { exchange: Arc::new(exchange), current: Mutex::new(None), expiry_skew_seconds }
    }

    /// Return a valid access token, exchanging credentials when none is
    /// cached or the cached one is stale
    ///
    /// # Errors
    /// Returns the exchange error; the cache is left empty so the next call
    /// tries again
    pub async fn access_token(&self) -> Result<String, OAuthClientError> {
        let mut current = self.current.lock().await;

        if let Some(token) = current.as_ref() {
            if !token.is_expired(self.expiry_skew_seconds) {
                return Ok(token.access_token.clone());
            }
            debug!("cached token is stale, exchanging credentials again");
        }

        *current = None;
        let token = self.exchange.exchange().await?;
        info!(expires_in = token.expires_in, "token manager cached new access token");

        let access_token = token.access_token.clone();
        *current = Some(token);
        Ok(access_token)
    }

    /// Snapshot of the cached token, if any
    pub async fn current_token(&self) -> Option<AuthToken> {
        self.current.lock().await.clone()
    }

    /// Drop the cached token so the next call exchanges again
    pub async fn invalidate(&self) {
        *self.current.lock().await = None;
    }
}

impl<E: TokenExchange + 'static> std::fmt::Debug for TokenManager<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("expiry_skew_seconds", &self.expiry_skew_seconds)
            .finish_non_exhaustive()
    }
}
