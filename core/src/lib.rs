//! Client core for a remotely-stored posts collection.
//!
//! # Overview
//! CRUD operations against a REST posts endpoint, executed through a
//! request pipeline with interceptor chaining: bearer-token injection on
//! every physical attempt and capped linear retry on timeout/transient
//! transport failures. A state store holds the fetched collection and
//! mediates between UI callers and the transport, notifying subscribers
//! on every phase transition.
//!
//! # Design
//! - `PostsClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`, so status interpretation and
//!   decoding never touch the network.
//! - `Dispatcher` owns the round-trip: it folds the interceptor chain over
//!   a fresh clone of the request once per physical attempt and retries
//!   only transport-level failures, bounded by the `RequestContext`
//!   attempt counter.
//! - `Transport` is the I/O seam: reqwest in production (`HttpTransport`),
//!   scripted in-memory transports in tests.
//! - `SessionManager` holds the optional session behind a pluggable
//!   `CredentialVerifier`; the core only ever consumes the token.
//! - `PostStore` mutates state solely at call-completion points and
//!   enforces single-flight with an explicit phase guard.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod session;
pub mod store;
pub mod transport;
pub mod types;

pub use client::PostsClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestContext};
pub use pipeline::{AuthInjector, Dispatcher, Interceptor};
pub use session::{
    AuthError, CredentialVerifier, Session, SessionManager, StaticVerifier, TokenProvider,
};
pub use store::{ClientState, Notice, Phase, PostStore, StateChange, StoreError};
pub use transport::{HttpTransport, RetryPolicy, Transport, TransportError};
pub use types::{DraftPost, Post};
