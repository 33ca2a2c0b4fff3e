//! HTTP types shared by the request pipeline.
//!
//! # Design
//! Requests and responses are plain data. `PostsClient` builds `HttpRequest`
//! values and parses `HttpResponse` values without touching the network;
//! the `Dispatcher` owns the actual round-trip. Keeping the boundary as data
//! makes interceptors pure transforms and keeps parsing deterministic and
//! easy to test.
//!
//! All fields use owned types (`String`, `Vec`) so a request can be cloned
//! per physical attempt without lifetime concerns.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data.
///
/// Built by `PostsClient::build_*` methods. The `Dispatcher` clones it once
/// per physical attempt, runs the interceptor chain over the clone, and
/// executes the result against the `Transport`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// A well-formed HTTP response, whatever its status code.
///
/// Produced by the `Transport` after executing an `HttpRequest`, then passed
/// to `PostsClient::parse_*` methods for status interpretation and decoding.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Per-logical-call metadata threaded through repeated physical attempts.
///
/// Created when a call is dispatched and dropped when it resolves or
/// exhausts its retries. The attempt counter lives here, not in any
/// interceptor, so resubmission can never recurse past the configured limit.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Physical attempts already completed (0 on the first attempt).
    pub attempt: u32,
}

impl RequestContext {
    pub fn new() -> Self {
        Self { attempt: 0 }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
