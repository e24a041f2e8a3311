//! Analytics platform API client
//!
//! # Architecture
//!
//! - [`client`]: request construction, dispatch and response classification
//! - [`auth`]: token sources (client credentials, static token)
//! - [`crud`]: generic resource helpers over [`Client`]
//! - [`sessions`]: session, workspace and impersonation endpoints
//! - [`workspace`]: lazily created dev-workspace duplicate connections
//! - [`logging`]: a ready-made completion callback
//!
//! Every request passes through the client's [`RateLimiter`] before it is
//! sent. Nothing is retried: failures surface to the caller immediately.
//!
//! [`RateLimiter`]: lookerkit_common::resilience::RateLimiter

pub mod auth;
pub mod client;
pub mod crud;
pub mod errors;
pub mod logging;
pub mod sessions;
pub mod workspace;

pub use auth::{AccessTokenProvider, ClientCredentialsAuth, StaticTokenAuth};
pub use client::{
    ApiResponse, Client, ClientBuilder, Credentials, RequestCompletionCallback, RequestSummary,
    DEFAULT_USER_AGENT,
};
pub use crud::{join_path, with_query};
pub use errors::{ApiError, ApiErrorCategory, ApiResult, ErrorResponse, FieldError};
pub use logging::tracing_callback;
pub use workspace::DuplicateState;
