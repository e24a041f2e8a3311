//! # Lookerkit Infrastructure
//!
//! I/O side of the analytics platform API client runtime.
//!
//! This crate contains:
//! - The HTTP transport wrapper
//! - The API client: request builder, dispatcher and error classification
//! - Generic CRUD helpers, session endpoints and dev-workspace duplicates
//! - Configuration loading from the environment and files
//!
//! ## Architecture
//! - Data model lives in `lookerkit-domain`
//! - Pacing and OAuth2 token lifecycle come from `lookerkit-common`
//! - Never installs a tracing subscriber; that is the application's call

pub mod api;
pub mod config;
pub mod http;

// Re-export commonly used items
pub use api::{
    ApiError, ApiErrorCategory, ApiResponse, ApiResult, Client, ClientBuilder, Credentials,
    DuplicateState, ErrorResponse,
};
pub use http::{HttpClient, HttpClientBuilder};
