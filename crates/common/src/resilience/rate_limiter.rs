//! Fixed-interval request pacing
//!
//! A [`RateLimiter`] hands out start slots spaced `interval` apart. Each
//! caller reserves the next free slot under a short lock and then sleeps
//! until it, so admission order equals reservation order and no two callers
//! start closer together than the interval.
//!
//! A caller that stops waiting before its slot (its future is dropped, for
//! example on cancellation) hands the slot back if nobody queued behind it.
//! Once later callers hold reservations the slot stays spent: they are
//! already sleeping toward their own times and are not moved forward.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// One request per second, the pacing applied when nothing else is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

static SHARED: Lazy<Arc<RateLimiter>> = Lazy::new(|| Arc::new(RateLimiter::new(DEFAULT_INTERVAL)));

/// Configuration for the request pacer
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Minimum spacing between two admitted requests. Zero disables pacing.
    pub interval: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self { interval: DEFAULT_INTERVAL }
    }
}

impl RateLimiterConfig {
    /// Create a new configuration builder
    pub fn builder() -> RateLimiterConfigBuilder {
        RateLimiterConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.interval > Duration::from_secs(3600) {
            return Err("interval must not exceed one hour".to_string());
        }
        Ok(())
    }
}

/// Builder for RateLimiterConfig
#[derive(Debug)]
pub struct RateLimiterConfigBuilder {
    config: RateLimiterConfig,
}

impl Default for RateLimiterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiterConfigBuilder {
    pub fn new() -> Self {
        Self { config: RateLimiterConfig::default() }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    pub fn build(self) -> Result<RateLimiterConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Process-wide pacing gate
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use lookerkit_common::resilience::RateLimiter;
///
/// # async fn example() {
/// let limiter = RateLimiter::new(Duration::from_millis(250));
///
/// limiter.wait().await; // admitted immediately
/// limiter.wait().await; // admitted ~250ms later
/// # }
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter admitting one caller per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self { interval, next_slot: Mutex::new(None) }
    }

    /// Create a limiter from a validated configuration.
    pub fn from_config(config: &RateLimiterConfig) -> Result<Self, String> {
        config.validate()?;
        Ok(Self::new(config.interval))
    }

    /// The process-wide limiter shared by every client that was not given
    /// its own.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block until this caller may start its request.
    ///
    /// Cancel-safe: dropping the future early releases the reservation when
    /// it is still the last one handed out.
    pub async fn wait(&self) {
        let mut reservation = Reservation { limiter: self, slot: self.reserve(), admitted: false };
        let now = Instant::now();

        if reservation.slot > now {
            let delay = reservation.slot - now;
            debug!(
                wait_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "pacing outbound request"
            );
            sleep_until(reservation.slot).await;
        }
        reservation.admitted = true;
    }

    /// Reserve the next start slot and return it.
    fn reserve(&self) -> Instant {
        let mut next = self.next_slot.lock();
        let now = Instant::now();

        let slot = match *next {
            Some(at) if at > now => at,
            _ => now,
        };
        *next = Some(slot + self.interval);
        slot
    }
}

/// A reserved start slot, released on drop unless the caller was admitted
struct Reservation<'a> {
    limiter: &'a RateLimiter,
    slot: Instant,
    admitted: bool,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if self.admitted {
            return;
        }

        let mut next = self.limiter.next_slot.lock();
        if *next == Some(self.slot + self.limiter.interval) {
            *next = Some(self.slot);
            debug!("released unused pacing slot");
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}
