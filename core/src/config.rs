//! Client configuration: endpoint, deadlines, retry policy.

use std::time::Duration;

use crate::transport::RetryPolicy;

/// Default public endpoint for the posts collection.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com/posts";

/// Static configuration for one client instance.
///
/// The deadlines apply per physical attempt, not per logical call; a call
/// that retries twice may take up to three full deadline windows plus two
/// backoff delays.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The collection endpoint, e.g. `https://example.com/posts`.
    pub base_url: String,
    /// Deadline for establishing the connection.
    pub connect_timeout: Duration,
    /// Deadline for receiving the response.
    pub read_timeout: Duration,
    /// Retry policy for timeout and transient transport failures.
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(3),
            retry: RetryPolicy::default(),
        }
    }
}
