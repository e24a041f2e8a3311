//! API error types
//!
//! Every failure the client can produce, classified so callers can tell a
//! local mistake (bad argument, bad configuration) from a server rejection
//! or a contract mismatch.

use std::fmt;

use lookerkit_common::null_as_default;
use lookerkit_domain::{ArgError, LookerkitError};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Coarse classification of [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Invalid caller input, rejected before any request was sent
    Argument,
    /// DNS, connection or TLS failure
    Transport,
    /// Malformed URL or unencodable body, caught before any I/O
    Encoding,
    /// Non-2xx response from the server
    Api,
    /// 2xx response whose body did not match the expected shape
    Decode,
    /// Token acquisition failed
    Authentication,
    /// Client setup problem
    Config,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Argument(#[from] ArgError),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Response(Box<ErrorResponse>),

    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Expected a response body but got none ({0})")]
    EmptyBody(StatusCode),

    #[error("Failed to write response body: {0}")]
    Io(#[from] std::io::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("did not find dev workspace: server reported workspace {0:?}")]
    WorkspaceNotHonored(String),
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Argument(_) => ApiErrorCategory::Argument,
            Self::Transport(_) | Self::Io(_) => ApiErrorCategory::Transport,
            Self::Url(_) | Self::Encode(_) => ApiErrorCategory::Encoding,
            Self::Response(_) => ApiErrorCategory::Api,
            Self::Decode(_) | Self::EmptyBody(_) => ApiErrorCategory::Decode,
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::Config(_) | Self::InvalidHeader(_) | Self::WorkspaceNotHonored(_) => {
                ApiErrorCategory::Config
            }
        }
    }

    /// Structured server error, when the server answered with a non-2xx status
    pub fn error_response(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Response(response) => Some(response.as_ref()),
            _ => None,
        }
    }

    /// HTTP status of a server rejection
    pub fn status(&self) -> Option<StatusCode> {
        self.error_response().map(|response| response.status)
    }

    /// Whether the server reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_argument_error(&self) -> bool {
        matches!(self, Self::Argument(_))
    }
}

/// One field-level complaint inside an [`ErrorResponse`]
///
/// `field` names the attribute of the original request body that the server
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub documentation_url: Option<String>,
}

/// A non-2xx response
///
/// Carries the decoded error body together with the request line, status and
/// headers of the failed exchange.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub method: Method,
    #[serde(skip)]
    pub url: Option<Url>,
    #[serde(skip)]
    pub status: StatusCode,
    #[serde(skip)]
    pub headers: HeaderMap,

    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, alias = "docs", deserialize_with = "null_as_default")]
    pub documentation_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<FieldError>,
}

impl ErrorResponse {
    /// Build the error for a failed exchange from its raw body
    ///
    /// A body that is not the JSON error shape, or carries no message and no
    /// field errors, is kept verbatim as the message.
    pub fn from_body(
        method: Method,
        url: Url,
        status: StatusCode,
        headers: HeaderMap,
        body: &[u8],
    ) -> Self {
        let mut response = match serde_json::from_slice::<Self>(body) {
            Ok(parsed) if !parsed.message.is_empty() || !parsed.errors.is_empty() => parsed,
            _ => Self { message: String::from_utf8_lossy(body).into_owned(), ..Self::default() },
        };

        response.method = method;
        response.url = Some(url);
        response.status = status;
        response.headers = headers;
        response
    }

    /// First field error naming `field`
    pub fn field_error(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.field.as_deref() == Some(field))
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = self.url.as_ref().map_or("", Url::as_str);
        write!(f, "{} {}: {} {}", self.method, url, self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ErrorResponse {}

impl From<LookerkitError> for ApiError {
    fn from(error: LookerkitError) -> Self {
        match error {
            LookerkitError::InvalidInput(reason) => Self::Argument(ArgError::new("input", reason)),
            other => Self::Config(other.to_string()),
        }
    }
}

impl From<ErrorResponse> for ApiError {
    fn from(response: ErrorResponse) -> Self {
        Self::Response(Box::new(response))
    }
}
