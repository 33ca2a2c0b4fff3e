//! State store mediating between UI callers and the transport client.
//!
//! # Design
//! `PostStore` owns the held collection, the optional search result, the
//! loading phase and a single message slot. State mutates only at the
//! completion points of transport calls, on one logical control flow:
//! operations take `&mut self` and run to completion, and an explicit
//! phase guard rejects a second operation while one is outstanding rather
//! than relying on callers to serialize.
//!
//! Observers subscribe to a `broadcast` channel and receive at least one
//! `StateChange` per phase transition: enter-loading, then settle. Retries
//! inside the dispatcher are invisible here except as latency; the store
//! never retries anything itself.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;

use crate::client::PostsClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::pipeline::{AuthInjector, Dispatcher};
use crate::session::SessionManager;
use crate::transport::{HttpTransport, Transport, TransportError};
use crate::types::{DraftPost, Post};

/// Loading/search phase of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    /// A lookup-by-id is being displayed; left only via `clear_search`
    /// (or by removing the searched post).
    SearchMode,
}

/// The single current message slot: last error or success notice.
///
/// Overwritten by newer notices, cleared at the start of the next
/// operation, and consumed exactly once via `take_message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    LoginSucceeded { username: String },
    LoginFailed(String),
    LoggedOut,
    PostNotFound(u64),
    Created(u64),
    Updated(u64),
    Removed(u64),
    Failed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::LoginSucceeded { username } => write!(f, "logged in as {username}"),
            Notice::LoginFailed(reason) => write!(f, "login failed: {reason}"),
            Notice::LoggedOut => write!(f, "logged out"),
            Notice::PostNotFound(id) => write!(f, "no post with id {id}"),
            Notice::Created(id) => write!(f, "post {id} created"),
            Notice::Updated(id) => write!(f, "post {id} updated"),
            Notice::Removed(id) => write!(f, "post {id} deleted"),
            Notice::Failed(message) => write!(f, "{message}"),
        }
    }
}

/// Phase-transition event delivered to subscribers, at least once each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Loading,
    Settled(Phase),
}

/// The state held on behalf of UI callers.
#[derive(Debug, Clone)]
pub struct ClientState {
    /// Server order on fetch, insertion order for local creates (front).
    pub posts: Vec<Post>,
    /// Set by a lookup-by-id, cleared only on explicit "show all".
    pub searched: Option<Post>,
    pub phase: Phase,
    pub message: Option<Notice>,
}

impl ClientState {
    fn new() -> Self {
        Self {
            posts: Vec::new(),
            searched: None,
            phase: Phase::Idle,
            message: None,
        }
    }
}

/// Rejection of an operation issued while another is outstanding.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("another operation is still in flight")]
    Busy,
}

/// Holds `ClientState` and runs CRUD operations through the dispatcher.
pub struct PostStore<T> {
    client: PostsClient,
    dispatcher: Dispatcher<T>,
    state: ClientState,
    changes: broadcast::Sender<StateChange>,
}

impl PostStore<HttpTransport> {
    /// Fully wired store: reqwest transport, auth injection reading the
    /// given session manager on every attempt.
    pub fn with_http(
        config: &ClientConfig,
        sessions: SessionManager,
    ) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config)?;
        let dispatcher = Dispatcher::new(transport, config.retry)
            .with_interceptor(Box::new(AuthInjector::new(Arc::new(sessions))));
        Ok(Self::new(config, dispatcher))
    }
}

impl<T: Transport> PostStore<T> {
    pub fn new(config: &ClientConfig, dispatcher: Dispatcher<T>) -> Self {
        let (changes, _) = broadcast::channel(32);
        Self {
            client: PostsClient::new(&config.base_url),
            dispatcher,
            state: ClientState::new(),
            changes,
        }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// Subscribe to phase-transition events. Receivers that fall behind the
    /// channel capacity observe a lag, never a missed settle.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }

    /// Surface the current message exactly once.
    pub fn take_message(&mut self) -> Option<Notice> {
        self.state.message.take()
    }

    /// Replace the held collection from the server, preserving its order.
    ///
    /// Leaves the search result untouched; only `clear_search` drops it.
    pub async fn refresh_all(&mut self) -> Result<(), StoreError> {
        let resume = self.begin()?;
        match self.fetch_all_call().await {
            Ok(posts) => {
                tracing::debug!(count = posts.len(), "collection refreshed");
                self.state.posts = posts;
            }
            Err(err) => self.record_failure("refresh", &err),
        }
        self.settle(resume);
        Ok(())
    }

    /// Look up one post by id. Absence is a notice, not an error.
    pub async fn search_by_id(&mut self, id: u64) -> Result<(), StoreError> {
        self.begin()?;
        match self.fetch_by_id_call(id).await {
            Ok(Some(post)) => {
                self.state.searched = Some(post);
                self.settle(Phase::SearchMode);
            }
            Ok(None) => {
                self.state.searched = None;
                self.state.message = Some(Notice::PostNotFound(id));
                self.settle(Phase::SearchMode);
            }
            Err(err) => {
                self.record_failure("search", &err);
                self.settle(Phase::Idle);
            }
        }
        Ok(())
    }

    /// Explicit "show all": drop the search result, leave search mode,
    /// and refresh the collection.
    pub async fn clear_search(&mut self) -> Result<(), StoreError> {
        if self.state.phase == Phase::Loading {
            return Err(StoreError::Busy);
        }
        self.state.searched = None;
        self.state.phase = Phase::Idle;
        self.refresh_all().await
    }

    /// Create a post and insert the server-assigned result at the front.
    /// No optimistic insert: the collection changes only once the server
    /// has assigned an id.
    pub async fn create(&mut self, title: &str, body: &str, user_id: u64) -> Result<(), StoreError> {
        let resume = self.begin()?;
        let draft = DraftPost {
            user_id,
            title: title.to_string(),
            body: body.to_string(),
        };
        match self.create_call(&draft).await {
            Ok(post) => {
                let id = post.id;
                self.state.posts.insert(0, post);
                self.state.message = Some(Notice::Created(id));
            }
            Err(err) => self.record_failure("create", &err),
        }
        self.settle(resume);
        Ok(())
    }

    /// Update a post. If the id is absent from the held collection the
    /// write still counts as success when the server accepted it; only a
    /// matching element (and a matching search result) is replaced.
    pub async fn update(
        &mut self,
        id: u64,
        title: &str,
        body: &str,
        user_id: u64,
    ) -> Result<(), StoreError> {
        let resume = self.begin()?;
        let post = Post {
            user_id,
            id,
            title: title.to_string(),
            body: body.to_string(),
        };
        match self.update_call(&post).await {
            Ok(updated) => {
                if let Some(held) = self.state.posts.iter_mut().find(|p| p.id == updated.id) {
                    *held = updated.clone();
                }
                if self.state.searched.as_ref().is_some_and(|s| s.id == updated.id) {
                    self.state.searched = Some(updated.clone());
                }
                self.state.message = Some(Notice::Updated(updated.id));
            }
            Err(err) => self.record_failure("update", &err),
        }
        self.settle(resume);
        Ok(())
    }

    /// Delete a post. Removing the active search result also leaves
    /// search mode.
    pub async fn remove(&mut self, id: u64) -> Result<(), StoreError> {
        let mut resume = self.begin()?;
        match self.remove_call(id).await {
            Ok(()) => {
                self.state.posts.retain(|p| p.id != id);
                if self.state.searched.as_ref().is_some_and(|s| s.id == id) {
                    self.state.searched = None;
                    resume = Phase::Idle;
                }
                self.state.message = Some(Notice::Removed(id));
            }
            Err(err) => self.record_failure("remove", &err),
        }
        self.settle(resume);
        Ok(())
    }

    /// React to an authentication transition: refresh the collection under
    /// the new authorization context, then surface the transition notice.
    /// An empty authenticated result set stays "no data" — the store never
    /// infers "unauthenticated" from an empty list.
    pub async fn session_changed(&mut self, notice: Notice) -> Result<(), StoreError> {
        self.refresh_all().await?;
        self.state.message = Some(notice);
        Ok(())
    }

    /// Enter Loading, clearing the message slot. Returns the phase to
    /// settle back into. Fails fast while another operation is outstanding.
    fn begin(&mut self) -> Result<Phase, StoreError> {
        if self.state.phase == Phase::Loading {
            return Err(StoreError::Busy);
        }
        let resume = self.state.phase;
        self.state.message = None;
        self.state.phase = Phase::Loading;
        self.notify(StateChange::Loading);
        Ok(resume)
    }

    fn settle(&mut self, phase: Phase) {
        self.state.phase = phase;
        self.notify(StateChange::Settled(phase));
    }

    fn notify(&self, change: StateChange) {
        // Send only fails with zero subscribers, which is fine.
        let _ = self.changes.send(change);
    }

    fn record_failure(&mut self, operation: &str, err: &ApiError) {
        tracing::warn!(operation, error = %err, "operation failed");
        self.state.message = Some(Notice::Failed(err.to_string()));
    }

    async fn fetch_all_call(&self) -> Result<Vec<Post>, ApiError> {
        let response = self.dispatcher.send(&self.client.build_fetch_all()).await?;
        self.client.parse_fetch_all(response)
    }

    async fn fetch_by_id_call(&self, id: u64) -> Result<Option<Post>, ApiError> {
        let response = self
            .dispatcher
            .send(&self.client.build_fetch_by_id(id))
            .await?;
        self.client.parse_fetch_by_id(response)
    }

    async fn create_call(&self, draft: &DraftPost) -> Result<Post, ApiError> {
        let request = self.client.build_create(draft)?;
        let response = self.dispatcher.send(&request).await?;
        self.client.parse_create(response)
    }

    async fn update_call(&self, post: &Post) -> Result<Post, ApiError> {
        let request = self.client.build_update(post)?;
        let response = self.dispatcher.send(&request).await?;
        self.client.parse_update(response)
    }

    async fn remove_call(&self, id: u64) -> Result<(), ApiError> {
        let response = self.dispatcher.send(&self.client.build_remove(id)).await?;
        self.client.parse_remove(response)
    }

    #[cfg(test)]
    fn force_loading(&mut self) {
        self.state.phase = Phase::Loading;
    }
}
