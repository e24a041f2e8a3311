//! # Lookerkit Domain
//!
//! Data model for the analytics platform API client runtime.
//!
//! This crate contains:
//! - Resource identifiers and list options used to build request paths
//! - Session, workspace and rate-limit snapshot types
//! - Client configuration structures
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - Depends only on the foundation tier of `lookerkit-common`
//! - No I/O: pure data structures and validation

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::base_url::normalize_base_url;
