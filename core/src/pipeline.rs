//! Interceptor chain and retry dispatch around the transport.
//!
//! # Design
//! An interceptor is a pure transform over a per-attempt clone of the base
//! request; the ordered chain is folded over that clone once per PHYSICAL
//! attempt, never once per logical call. That is what keeps the auth header
//! present on resubmitted requests without any shared mutable state.
//!
//! The retry loop lives in `Dispatcher::send`, around the attempt closure.
//! Only transport-level `Timeout` and `Transient` failures are resubmitted,
//! after a fixed backoff via `tokio::time::sleep`; a well-formed HTTP
//! response of any status resolves the call immediately. The attempt
//! counter rides on `RequestContext`, so the loop is bounded by the
//! configured limit no matter how the failures arrive.

use std::sync::Arc;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, RequestContext};
use crate::session::TokenProvider;
use crate::transport::{RetryPolicy, Transport};

/// A pure request transform applied once per physical attempt.
pub trait Interceptor: Send + Sync {
    fn apply(&self, request: HttpRequest, cx: &RequestContext) -> HttpRequest;
}

/// Attaches `Authorization: Bearer <token>` when a token is available.
///
/// Re-reads the provider on every attempt, so a login or logout that lands
/// between retries is reflected on the next resubmission. Never fails; with
/// no token the request goes out unauthenticated.
pub struct AuthInjector {
    tokens: Arc<dyn TokenProvider>,
}

impl AuthInjector {
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self { tokens }
    }
}

impl Interceptor for AuthInjector {
    fn apply(&self, mut request: HttpRequest, _cx: &RequestContext) -> HttpRequest {
        if let Some(token) = self.tokens.current_token() {
            request
                .headers
                .push(("authorization".to_string(), format!("Bearer {token}")));
        }
        request
    }
}

/// Runs logical calls: interceptor chain per attempt, capped linear retry.
pub struct Dispatcher<T> {
    transport: T,
    interceptors: Vec<Box<dyn Interceptor>>,
    retry: RetryPolicy,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T, retry: RetryPolicy) -> Self {
        Self {
            transport,
            interceptors: Vec::new(),
            retry,
        }
    }

    /// Append an interceptor. Chain order is registration order.
    pub fn with_interceptor(mut self, interceptor: Box<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Execute one logical call: up to `retry.limit + 1` physical attempts.
    ///
    /// The returned error is the classification of the final attempt;
    /// classification is performed once, here, not per attempt.
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut cx = RequestContext::new();
        loop {
            let attempt = self
                .interceptors
                .iter()
                .fold(request.clone(), |req, i| i.apply(req, &cx));
            tracing::debug!(
                method = ?attempt.method,
                url = %attempt.url,
                attempt = cx.attempt,
                "dispatching request"
            );

            match self.transport.execute(&attempt).await {
                Ok(response) => {
                    tracing::debug!(status = response.status, "response received");
                    return Ok(response);
                }
                Err(err) if err.is_retryable() && cx.attempt < self.retry.limit => {
                    tracing::warn!(
                        attempt = cx.attempt,
                        error = %err,
                        backoff_ms = self.retry.backoff.as_millis() as u64,
                        "transport failure, resubmitting after backoff"
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                    cx.attempt += 1;
                }
                Err(err) => {
                    tracing::debug!(attempts = cx.attempt + 1, error = %err, "call failed");
                    return Err(err.into());
                }
            }
        }
    }
}
