//! Error taxonomy for the posts API client.
//!
//! # Design
//! Classification happens once per logical call, after the retry loop has
//! run its course. `Server` covers every well-formed non-success HTTP
//! response and is never retried; `Timeout` and `Transient` are the two
//! retryable transport classes, surfaced here only once retries are
//! exhausted. "Post does not exist" on a lookup is not an error at all —
//! `PostsClient::parse_fetch_by_id` models it as `None`.

use thiserror::Error;

/// Classified failure of a logical API call.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The response body does not match the expected shape. Never retried.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("request encode failed: {0}")]
    Encode(String),

    /// The server returned a well-formed response outside the expected
    /// success status. Never retried.
    #[error("server returned HTTP {status}{}", fmt_detail(.detail))]
    Server { status: u16, detail: Option<String> },

    /// A connect or receive deadline was exceeded on every attempt.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// An unclassified network-level failure persisted through every attempt.
    #[error("network failure: {0}")]
    Transient(String),

    /// The call was aborted before completion.
    #[error("request cancelled: {0}")]
    Cancelled(String),
}

impl ApiError {
    /// Build a `Server` error from a status code and raw response body,
    /// extracting a `message` field from a JSON body when one is present.
    pub fn server(status: u16, body: &str) -> Self {
        let detail = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(json) => json
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .or_else(|| non_empty(body)),
            Err(_) => non_empty(body),
        };
        ApiError::Server { status, detail }
    }
}

fn non_empty(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}

fn fmt_detail(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {d}"),
        None => String::new(),
    }
}
