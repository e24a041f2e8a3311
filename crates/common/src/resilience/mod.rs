//! Request pacing for outbound API traffic
//!
//! The remote API enforces server-side rate limits. Concurrent resource
//! operations would otherwise burst past them, so every client in the process
//! funnels through one [`RateLimiter`] that admits a single request per fixed
//! interval.
//!
//! The limiter is a pacing valve only: it never fails, never drops a caller
//! and applies no jitter or backoff. Retry policy belongs to the caller.
//!
//! ## Sharing
//!
//! [`RateLimiter::shared`] returns the process-wide instance. Client builders
//! fall back to it when no limiter is injected, so a primary client and any
//! clients derived from it share one gate unless a caller wires otherwise.

pub mod rate_limiter;

pub use rate_limiter::{RateLimiter, RateLimiterConfig, RateLimiterConfigBuilder, DEFAULT_INTERVAL};
