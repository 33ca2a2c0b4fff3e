//! Transport seam: one physical HTTP attempt.
//!
//! # Design
//! `Transport` executes exactly one attempt and classifies failures at the
//! transport level only. A well-formed HTTP response is always `Ok`,
//! whatever its status code — status interpretation belongs to
//! `PostsClient::parse_*`. The trait is the test seam: unit tests drive the
//! retry loop with a scripted in-memory transport, integration tests use
//! the reqwest-backed `HttpTransport`.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Transport-level failure of a single physical attempt.
///
/// `Timeout` and `Transient` are eligible for retry; `Cancelled` is not.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// A connect or receive deadline was exceeded.
    #[error("deadline exceeded: {0}")]
    Timeout(String),

    /// The attempt was aborted before completion.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Unclassified network-level failure.
    #[error("network failure: {0}")]
    Transient(String),
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Timeout(_) | TransportError::Transient(_))
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(msg) => ApiError::Timeout(msg),
            TransportError::Cancelled(msg) => ApiError::Cancelled(msg),
            TransportError::Transient(msg) => ApiError::Transient(msg),
        }
    }
}

/// Executes one physical HTTP attempt.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// reqwest-backed transport with per-attempt connect and receive deadlines.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport from the configured deadlines.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()
            .map_err(|e| TransportError::Transient(format!("client build failed: {e}")))?;
        Ok(Self { client })
    }

    /// Transport with default deadlines (5s connect, 3s receive).
    pub fn with_defaults() -> Result<Self, TransportError> {
        Self::new(&ClientConfig::default())
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(classify)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        // The receive deadline can also trip while the body streams in.
        let body = response.text().await.map_err(classify)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Classify a reqwest error at the transport level.
fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Transient(format!("connection failed: {e}"))
    } else {
        TransportError::Transient(e.to_string())
    }
}

/// Fixed-delay retry policy for the dispatcher loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Resubmissions allowed after the first attempt.
    pub limit: u32,
    /// Fixed delay before each resubmission. No exponential growth.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            limit: 2,
            backoff: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_and_transient_are_retryable() {
        assert!(TransportError::Timeout("t".into()).is_retryable());
        assert!(TransportError::Transient("t".into()).is_retryable());
        assert!(!TransportError::Cancelled("c".into()).is_retryable());
    }

    #[test]
    fn transport_error_maps_into_api_error() {
        assert!(matches!(
            ApiError::from(TransportError::Timeout("t".into())),
            ApiError::Timeout(_)
        ));
        assert!(matches!(
            ApiError::from(TransportError::Cancelled("c".into())),
            ApiError::Cancelled(_)
        ));
        assert!(matches!(
            ApiError::from(TransportError::Transient("n".into())),
            ApiError::Transient(_)
        ));
    }

    #[test]
    fn default_retry_policy_matches_contract() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.limit, 2);
        assert_eq!(policy.backoff, Duration::from_secs(1));
    }
}
