//! API constants
//!
//! Paths are relative to the API root (the base URL ends in `/api/`).

/// Base URL used when a client is built without one
pub const DEFAULT_BASE_URL: &str = "https://api.example.com/";

/// Content type of every request and response body
pub const MEDIA_TYPE: &str = "application/json";

pub const API_VERSION: &str = "4.0";

/// Client-credentials token endpoint; `/<user_id>` appended it issues an
/// impersonation token instead
pub const LOGIN_PATH: &str = "4.0/login";

pub const SESSION_PATH: &str = "4.0/session";
pub const CURRENT_USER_PATH: &str = "4.0/user";

// Advisory rate-limit headers
pub const HEADER_RATE_LIMIT: &str = "x-ratelimit-limit";
pub const HEADER_RATE_REMAINING: &str = "x-ratelimit-remaining";
pub const HEADER_RATE_RESET: &str = "x-ratelimit-reset";

/// Unconsumed response bodies are drained up to this many bytes so the
/// connection can return to the pool
pub const MAX_BODY_SLURP_SIZE: usize = 2 << 10;
