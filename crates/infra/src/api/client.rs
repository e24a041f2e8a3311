//! API client runtime
//!
//! [`Client`] turns a path and an optional body into a protocol-correct
//! request, authenticates and paces it, executes it, and classifies the
//! response. Resource-specific operations are layered on top through the
//! generic helpers in [`super::crud`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use lookerkit_common::resilience::RateLimiter;
use lookerkit_domain::constants::{
    DEFAULT_BASE_URL, HEADER_RATE_LIMIT, HEADER_RATE_REMAINING, HEADER_RATE_RESET,
    MAX_BODY_SLURP_SIZE, MEDIA_TYPE,
};
use lookerkit_domain::{AuthConfig, ClientConfig, Rate, Workspace};
use parking_lot::Mutex;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT,
};
use reqwest::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument, warn};
use url::Url;

use super::auth::{AccessTokenProvider, ClientCredentialsAuth, StaticTokenAuth};
use super::errors::{ApiError, ApiResult, ErrorResponse};
use super::workspace::DuplicateSlot;
use crate::http::HttpClient;

/// User agent sent when the caller does not prepend its own product token
pub const DEFAULT_USER_AGENT: &str = concat!("lookerkit/", env!("CARGO_PKG_VERSION"));

/// Observer invoked with every completed exchange, before classification
pub type RequestCompletionCallback = Arc<dyn Fn(&RequestSummary, &Response) + Send + Sync>;

/// Request line of a completed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    pub method: Method,
    pub url: Url,
}

/// Metadata of a successful exchange
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub url: Url,
    /// Rate-limit snapshot parsed from this response
    pub rate: Rate,
}

/// Credentials a client authenticates with
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Exchanged at `<base>/4.0/login` on first use, renewed near expiry
    ClientCredentials { client_id: String, client_secret: String },
    /// Sent as-is, never refreshed
    StaticToken(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"[redacted]")
                .finish(),
            Self::StaticToken(_) => f.debug_tuple("StaticToken").field(&"[redacted]").finish(),
        }
    }
}

impl From<AuthConfig> for Credentials {
    fn from(config: AuthConfig) -> Self {
        match config {
            AuthConfig::ClientCredentials { client_id, client_secret } => {
                Self::ClientCredentials { client_id, client_secret }
            }
            AuthConfig::StaticToken { access_token } => Self::StaticToken(access_token),
        }
    }
}

enum AuthSetup {
    Credentials(Credentials),
    Provider(Arc<dyn AccessTokenProvider>),
}

/// Connection to one API instance
///
/// Safe to share between concurrent operations. The only state that changes
/// after construction is the advisory rate snapshot and the lazily created
/// dev-workspace duplicate.
pub struct Client {
    http: HttpClient,
    base_url: Url,
    user_agent: HeaderValue,
    headers: HeaderMap,
    auth: Option<Arc<dyn AccessTokenProvider>>,
    limiter: Arc<RateLimiter>,
    rate: Mutex<Rate>,
    on_request_completed: Option<RequestCompletionCallback>,
    pub(crate) workspace: Workspace,
    pub(crate) duplicate: DuplicateSlot,
}

impl Client {
    /// Create a builder for fluent configuration
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Unauthenticated client for `base_url`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Url` if `base_url` does not parse
    pub fn new(base_url: &str) -> ApiResult<Self> {
        Self::builder().base_url(base_url).build()
    }

    /// Client wired from a loaded configuration
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if `config` fails validation, otherwise the
    /// same errors as [`ClientBuilder::build`]
    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        config.validate()?;
        ClientBuilder::from_config(config).build()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.to_str().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Workspace this connection's session is pinned to
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Rate-limit snapshot from the most recent response
    pub fn rate(&self) -> Rate {
        self.rate.lock().clone()
    }

    /// Build a request for `path`, resolved relative to the base URL
    ///
    /// GET, HEAD and OPTIONS never carry a body. Other methods carry the
    /// JSON encoding of `body`, when given, and always declare a JSON
    /// content type. Static headers are applied first, then `Accept` and
    /// `User-Agent`. Authorization is attached at dispatch time.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Url` for an unresolvable path and `ApiError::Encode`
    /// for a body that cannot be serialized
    pub fn new_request<B>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<Request>
    where
        B: Serialize + ?Sized,
    {
        let url = self.base_url.join(path)?;
        let mut request = Request::new(method, url);

        if !matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
            if let Some(body) = body {
                let bytes = serde_json::to_vec(body).map_err(ApiError::Encode)?;
                *request.body_mut() = Some(bytes.into());
            }
            request.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(MEDIA_TYPE));
        }

        let headers = request.headers_mut();
        for (name, value) in &self.headers {
            headers.append(name.clone(), value.clone());
        }
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert(USER_AGENT, self.user_agent.clone());

        debug!(method = %request.method(), url = %request.url(), "built API request");
        Ok(request)
    }

    /// Execute `request` and decode a JSON body into `T`
    ///
    /// A 204 yields `None` without a decode attempt.
    ///
    /// # Errors
    ///
    /// Transport failures, non-2xx statuses (`ApiError::Response`, carrying
    /// status and headers) and undecodable 2xx bodies (`ApiError::Decode`)
    #[instrument(skip_all, fields(method = %request.method(), url = %request.url()))]
    pub async fn execute<T>(&self, request: Request) -> ApiResult<(Option<T>, ApiResponse)>
    where
        T: DeserializeOwned,
    {
        let (response, meta) = self.dispatch(request).await?;

        if meta.status == StatusCode::NO_CONTENT {
            drain(response).await;
            return Ok((None, meta));
        }

        let body = response.bytes().await?;
        let value = serde_json::from_slice(&body).map_err(ApiError::Decode)?;
        Ok((Some(value), meta))
    }

    /// Execute `request` and stream the raw body into `sink`
    ///
    /// Used for payloads that are not JSON, such as public keys served as
    /// plain text. A 204 writes nothing.
    #[instrument(skip_all, fields(method = %request.method(), url = %request.url()))]
    pub async fn execute_to_writer<W>(&self, request: Request, sink: &mut W) -> ApiResult<ApiResponse>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let (mut response, meta) = self.dispatch(request).await?;

        if meta.status != StatusCode::NO_CONTENT {
            while let Some(chunk) = response.chunk().await? {
                sink.write_all(&chunk).await?;
            }
            sink.flush().await?;
        }
        Ok(meta)
    }

    /// Execute `request` for its status only, discarding any body
    #[instrument(skip_all, fields(method = %request.method(), url = %request.url()))]
    pub async fn execute_discard(&self, request: Request) -> ApiResult<ApiResponse> {
        let (response, meta) = self.dispatch(request).await?;
        drain(response).await;
        Ok(meta)
    }

    /// Authenticate, pace, send, observe, and classify one request
    ///
    /// Returns the live response only for 2xx statuses.
    async fn dispatch(&self, mut request: Request) -> ApiResult<(Response, ApiResponse)> {
        if let Some(auth) = &self.auth {
            let token = auth.access_token().await?;
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::Auth(format!("access token is not a valid header: {e}")))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        self.limiter.wait().await;

        let summary = RequestSummary { method: request.method().clone(), url: request.url().clone() };
        let response = self.http.execute(request).await?;

        if let Some(callback) = &self.on_request_completed {
            callback(&summary, &response);
        }

        let rate = parse_rate(response.headers());
        *self.rate.lock() = rate.clone();

        let status = response.status();
        let headers = response.headers().clone();

        if !status.is_success() {
            let body = response.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            let error =
                ErrorResponse::from_body(summary.method, summary.url, status, headers, &body);
            warn!(status = status.as_u16(), message = %error.message, "API request rejected");
            return Err(error.into());
        }

        let meta = ApiResponse { status, headers, url: summary.url, rate };
        Ok((response, meta))
    }

    /// Builder pre-populated with everything a derived connection inherits:
    /// base URL, user agent, static headers, completion callback, the
    /// connection pool and the limiter.
    pub(crate) fn derived_builder(&self) -> ClientBuilder {
        ClientBuilder {
            base_url: Some(self.base_url.to_string()),
            user_agent: Some(self.user_agent().to_string()),
            header_map: self.headers.clone(),
            limiter: Some(Arc::clone(&self.limiter)),
            on_request_completed: self.on_request_completed.clone(),
            http: Some(self.http.clone()),
            ..ClientBuilder::default()
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent())
            .field("workspace", &self.workspace)
            .field("authenticated", &self.auth.is_some())
            .finish_non_exhaustive()
    }
}

/// Read and discard up to [`MAX_BODY_SLURP_SIZE`] bytes so a small body
/// does not keep the connection out of the pool.
async fn drain(mut response: Response) {
    let too_large =
        response.content_length().is_some_and(|len| len > MAX_BODY_SLURP_SIZE as u64);
    if too_large {
        return;
    }

    let mut read = 0;
    while read < MAX_BODY_SLURP_SIZE {
        match response.chunk().await {
            Ok(Some(chunk)) => read += chunk.len(),
            _ => break,
        }
    }
}

/// Advisory counters from `X-RateLimit-*` headers; missing or malformed
/// values leave the defaults.
fn parse_rate(headers: &HeaderMap) -> Rate {
    let number = |name: &str| {
        headers.get(name).and_then(|v| v.to_str().ok()).and_then(|v| v.trim().parse::<i64>().ok())
    };

    Rate {
        limit: number(HEADER_RATE_LIMIT).unwrap_or_default(),
        remaining: number(HEADER_RATE_REMAINING).unwrap_or_default(),
        reset: number(HEADER_RATE_RESET).and_then(|secs| DateTime::from_timestamp(secs, 0)),
    }
}

/// Builder for [`Client`]
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    user_agent: Option<String>,
    headers: Vec<(String, String)>,
    header_map: HeaderMap,
    auth: Option<AuthSetup>,
    limiter: Option<Arc<RateLimiter>>,
    on_request_completed: Option<RequestCompletionCallback>,
    timeout: Option<Duration>,
    http: Option<HttpClient>,
}

impl ClientBuilder {
    /// Builder wired from a loaded configuration
    ///
    /// The base URL is normalized to the API root. A non-default rate-limit
    /// interval gets a dedicated limiter; otherwise the process-wide one is
    /// used.
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut builder = Self::default().base_url(config.normalized_base_url());

        if let Some(ua) = &config.user_agent {
            builder = builder.user_agent(ua);
        }
        for (name, value) in &config.headers {
            builder = builder.header(name, value);
        }
        if let Some(auth) = &config.auth {
            builder = builder.credentials(auth.clone().into());
        }
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let shared = RateLimiter::shared();
        if config.rate_limit_interval != shared.interval() {
            builder = builder.rate_limiter(Arc::new(RateLimiter::new(config.rate_limit_interval)));
        }
        builder
    }

    /// API root, e.g. `https://acme.example.com/api/`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Prepend a product token to the library user agent
    pub fn user_agent(mut self, ua: impl AsRef<str>) -> Self {
        self.user_agent = Some(format!("{} {}", ua.as_ref(), DEFAULT_USER_AGENT));
        self
    }

    /// Add a static header sent with every request
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Authenticate with credentials; replaces any earlier auth choice
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.auth = Some(AuthSetup::Credentials(credentials));
        self
    }

    pub fn client_credentials(self, client_id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.credentials(Credentials::ClientCredentials {
            client_id: client_id.into(),
            client_secret: secret.into(),
        })
    }

    pub fn static_token(self, token: impl Into<String>) -> Self {
        self.credentials(Credentials::StaticToken(token.into()))
    }

    /// Authenticate through a custom token source; replaces any earlier
    /// auth choice
    pub fn auth_provider(mut self, provider: Arc<dyn AccessTokenProvider>) -> Self {
        self.auth = Some(AuthSetup::Provider(provider));
        self
    }

    /// Pace requests through `limiter` instead of the process-wide one
    pub fn rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn on_request_completed(mut self, callback: RequestCompletionCallback) -> Self {
        self.on_request_completed = Some(callback);
        self
    }

    /// Per-request timeout; none by default
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client
    ///
    /// Performs no network I/O: client credentials are exchanged on the
    /// first authenticated request.
    ///
    /// # Errors
    ///
    /// - `ApiError::Url` for a malformed base URL
    /// - `ApiError::InvalidHeader` for a header name or value (or user
    ///   agent) that cannot be sent
    /// - `ApiError::Config` for an empty static token or an HTTP stack that
    ///   fails to initialize
    pub fn build(self) -> ApiResult<Client> {
        let base_url = Url::parse(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL).trim())?;

        let http = match self.http {
            Some(http) => http,
            None => {
                let mut builder = HttpClient::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder
                    .build()
                    .map_err(|e| ApiError::Config(format!("Failed to build HttpClient: {e}")))?
            }
        };

        let mut headers = self.header_map;
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::InvalidHeader(format!("{name}: {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidHeader(format!("{name}: {e}")))?;
            headers.append(header_name, header_value);
        }

        let ua = self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let user_agent = HeaderValue::from_str(&ua)
            .map_err(|e| ApiError::InvalidHeader(format!("user agent: {e}")))?;

        let auth: Option<Arc<dyn AccessTokenProvider>> = match self.auth {
            None => None,
            Some(AuthSetup::Provider(provider)) => Some(provider),
            Some(AuthSetup::Credentials(Credentials::ClientCredentials {
                client_id,
                client_secret,
            })) => Some(Arc::new(ClientCredentialsAuth::new(
                &base_url,
                &client_id,
                &client_secret,
                http.inner().clone(),
            )?)),
            Some(AuthSetup::Credentials(Credentials::StaticToken(token))) => {
                if token.is_empty() {
                    return Err(ApiError::Config("no token provided".to_string()));
                }
                Some(Arc::new(StaticTokenAuth::new(token)))
            }
        };

        Ok(Client {
            http,
            base_url,
            user_agent,
            headers,
            auth,
            limiter: self.limiter.unwrap_or_else(RateLimiter::shared),
            rate: Mutex::new(Rate::default()),
            on_request_completed: self.on_request_completed,
            workspace: Workspace::default(),
            duplicate: DuplicateSlot::default(),
        })
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("authenticated", &self.auth.is_some())
            .finish_non_exhaustive()
    }
}
