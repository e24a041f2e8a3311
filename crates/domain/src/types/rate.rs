//! Advisory rate-limit snapshot

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rate-limit counters reported by the server on the last response
///
/// Observability data only. Request pacing is decided by the client's own
/// limiter, never by these values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// Requests allowed per window
    pub limit: i64,
    /// Requests left in the current window
    pub remaining: i64,
    /// When the window resets
    pub reset: Option<DateTime<Utc>>,
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.remaining, self.limit)?;
        if let Some(reset) = self.reset {
            write!(f, " (resets {})", reset.to_rfc3339())?;
        }
        Ok(())
    }
}
