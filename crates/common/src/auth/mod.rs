//! OAuth 2.0 client-credentials infrastructure
//!
//! The analytics API issues bearer tokens from its login endpoint in exchange
//! for an API client id and secret. This module owns that exchange and the
//! lifetime of the resulting token.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  TokenManager   │  Lazy exchange, cache, re-exchange near expiry
//! └────────┬────────┘
//!          │ TokenExchange
//!          ▼
//! ┌─────────────────┐
//! │   OAuthClient   │  POST <base>/4.0/login (credentials as form params)
//! └─────────────────┘
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use lookerkit_common::auth::{ClientCredentialsConfig, OAuthClient, TokenManager};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let token_url = Url::parse("https://acme.example.com/api/4.0/login")?;
//! let config = ClientCredentialsConfig::new(token_url, "client-id", "client-secret");
//! let manager = TokenManager::new(OAuthClient::new(config), 10);
//!
//! // First call performs the exchange; later calls reuse the cached token.
//! let token = manager.access_token().await?;
//! # let _ = token;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod token_manager;
pub mod traits;
pub mod types;

pub use client::{OAuthClient, OAuthClientError};
pub use token_manager::{TokenManager, DEFAULT_EXPIRY_SKEW_SECONDS};
pub use traits::TokenExchange;
pub use types::{trim_credential, AuthToken, ClientCredentialsConfig, OAuthError};
