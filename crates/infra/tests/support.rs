use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lookerkit_common::resilience::RateLimiter;
use lookerkit_infra::api::ClientBuilder;
use lookerkit_infra::Client;
use tracing::subscriber::DefaultGuard;
use wiremock::MockServer;

/// API root served by `server`, in the shape callers configure it
pub fn api_root(server: &MockServer) -> String {
    format!("{}/api/", server.uri())
}

/// Builder pointed at `server` with pacing disabled
pub fn builder(server: &MockServer) -> ClientBuilder {
    Client::builder()
        .base_url(api_root(server))
        .rate_limiter(Arc::new(RateLimiter::new(Duration::ZERO)))
}

/// Unauthenticated client pointed at `server` with pacing disabled
pub fn client(server: &MockServer) -> Client {
    builder(server).build().expect("client should build")
}

/// Static-token client pointed at `server` with pacing disabled
pub fn token_client(server: &MockServer, token: &str) -> Client {
    builder(server).static_token(token).build().expect("client should build")
}

/// Handle for inspecting captured log output during tests.
///
/// Capture is scoped to the current thread, so use it from
/// current-thread runtimes only.
pub struct LogHandle {
    buffer: Arc<Mutex<Vec<u8>>>,
    _guard: DefaultGuard,
}

impl LogHandle {
    /// All captured output, one formatted event per line.
    pub fn output(&self) -> String {
        let guard = self.buffer.lock().expect("log mutex poisoned");
        String::from_utf8_lossy(&guard).into_owned()
    }

    /// Check whether an event at `level` containing `needle` was captured.
    pub fn contains(&self, level: tracing::Level, needle: &str) -> bool {
        let level = level.to_string();
        self.output().lines().any(|line| line.contains(&level) && line.contains(needle))
    }
}

struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log mutex poisoned").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Install a capturing subscriber for the current thread and obtain a handle
/// for reading what it records.
pub fn init_test_logger() -> LogHandle {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer = Arc::clone(&buffer);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || CaptureWriter(Arc::clone(&writer)))
        .finish();

    LogHandle { buffer, _guard: tracing::subscriber::set_default(subscriber) }
}
