//! Request completion logging

use std::sync::Arc;

use reqwest::Response;
use tracing::{debug, warn};

use super::client::{RequestCompletionCallback, RequestSummary};

/// Completion callback that reports every exchange through `tracing`
///
/// Successful exchanges log at `debug`. Error statuses additionally log the
/// response headers and declared content length at `warn`.
pub fn tracing_callback() -> RequestCompletionCallback {
    Arc::new(log_completed)
}

fn log_completed(request: &RequestSummary, response: &Response) {
    let status = response.status();
    debug!(
        req_url = %request.url,
        req_method = %request.method,
        resp_status = status.as_u16(),
        "request completed"
    );

    if status.is_client_error() || status.is_server_error() {
        warn!(
            req_url = %request.url,
            req_method = %request.method,
            resp_status = status.as_u16(),
            resp_headers = ?response.headers(),
            resp_content_length = ?response.content_length(),
            "request returned error status"
        );
    }
}
