use std::time::Duration;

use reqwest::{Client as ReqwestClient, Request, Response};
use tracing::debug;

/// Thin wrapper over a pooled `reqwest` client.
///
/// Sends each request exactly once. Failed calls are surfaced to the caller
/// immediately; there is no retry layer here.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::builder().build()
    }

    /// Underlying connection pool, shared with the token exchange.
    pub fn inner(&self) -> &ReqwestClient {
        &self.client
    }

    /// Send a fully built request.
    pub async fn execute(&self, request: Request) -> Result<Response, reqwest::Error> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                debug!(%method, %url, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(err)
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
}

impl HttpClientBuilder {
    /// Bound every request by `timeout`. Unset by default: the caller's own
    /// deadline is the only cancellation surface.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<HttpClient, reqwest::Error> {
        let mut builder = ReqwestClient::builder().no_proxy();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(HttpClient { client: builder.build()? })
    }
}
