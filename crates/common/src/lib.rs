//! Modular common utilities shared across Lookerkit crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: serde helpers
//! - `runtime`: request pacing (resilience)
//! - `platform`: OAuth2 client-credentials exchange and token lifecycle
//! - `observability`: tracing output (implied by `runtime`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod utils;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod auth;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "platform")]
pub use auth::{
    AuthToken, ClientCredentialsConfig, OAuthClient, OAuthClientError, TokenExchange,
    TokenManager,
};
#[cfg(feature = "runtime")]
pub use resilience::{RateLimiter, RateLimiterConfig};
#[cfg(feature = "foundation")]
pub use utils::serde::{
    duration_millis, null_as_default, optional_string_or_number, string_or_number,
};
