//! Full lifecycle tests against the live mock server.
//!
//! Starts the server on an ephemeral port, then drives the store (and the
//! dispatcher underneath it) over real HTTP through the reqwest transport.
//! The server's state handle stays in-process, so tests can seed posts and
//! inspect the headers the client actually put on the wire.

use std::sync::Arc;
use std::time::Duration;

use posts_core::{
    ApiError, AuthInjector, ClientConfig, Dispatcher, HttpTransport, Notice, Phase, PostStore,
    PostsClient, RetryPolicy, SessionManager, StateChange, StaticVerifier,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn sample(id: u64, title: &str) -> mock_server::Post {
    mock_server::Post {
        user_id: 1,
        id,
        title: title.to_string(),
        body: "body".to_string(),
    }
}

/// Bind an ephemeral port, serve the mock API on it, and hand back the
/// collection endpoint plus the shared state handle.
async fn start_server() -> (String, mock_server::Db) {
    let db = mock_server::new_db();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_db = db.clone();
    tokio::spawn(async move {
        mock_server::run_with_state(listener, server_db).await.unwrap();
    });
    (format!("http://{addr}/posts"), db)
}

fn sessions() -> SessionManager {
    SessionManager::new(Arc::new(StaticVerifier::new("admin", "password123", "tok-it")))
}

#[tokio::test]
async fn crud_lifecycle_through_store() {
    init_tracing();
    let (base_url, db) = start_server().await;
    mock_server::seed(&db, vec![sample(1, "first"), sample(2, "second")]).await;

    let config = ClientConfig::new(&base_url);
    let mut store = PostStore::with_http(&config, sessions()).unwrap();

    // Refresh picks up the seeded posts in server order.
    store.refresh_all().await.unwrap();
    let ids: Vec<u64> = store.state().posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(store.state().phase, Phase::Idle);

    // Create gets the next sequential id and lands at the front.
    store.create("third", "3", 1).await.unwrap();
    assert_eq!(store.state().posts[0].id, 3);
    assert_eq!(store.state().posts.len(), 3);
    assert_eq!(store.take_message(), Some(Notice::Created(3)));

    // Update an existing post in place.
    store.update(1, "renamed", "r", 1).await.unwrap();
    let renamed = store.state().posts.iter().find(|p| p.id == 1).unwrap();
    assert_eq!(renamed.title, "renamed");

    // Search enters search mode with the fetched post.
    store.search_by_id(2).await.unwrap();
    assert_eq!(store.state().phase, Phase::SearchMode);
    assert_eq!(store.state().searched.as_ref().unwrap().title, "second");

    // Removing the searched post clears search mode.
    store.remove(2).await.unwrap();
    assert!(store.state().searched.is_none());
    assert_eq!(store.state().phase, Phase::Idle);
    assert!(store.state().posts.iter().all(|p| p.id != 2));

    // Show-all refreshes from the server.
    store.clear_search().await.unwrap();
    let ids: Vec<u64> = store.state().posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn search_for_missing_post_is_absent_not_error() {
    init_tracing();
    let (base_url, _db) = start_server().await;
    let config = ClientConfig::new(&base_url);
    let mut store = PostStore::with_http(&config, sessions()).unwrap();

    store.search_by_id(99).await.unwrap();
    assert!(store.state().searched.is_none());
    assert_eq!(store.take_message(), Some(Notice::PostNotFound(99)));
}

#[tokio::test]
async fn login_puts_bearer_token_on_subsequent_fetch() {
    init_tracing();
    let (base_url, db) = start_server().await;
    let config = ClientConfig::new(&base_url);
    let sessions = sessions();
    let mut store = PostStore::with_http(&config, sessions.clone()).unwrap();

    // Unauthenticated refresh carries no header.
    store.refresh_all().await.unwrap();
    assert!(db.read().await.last_authorization.is_none());

    // Login, then refresh under the new authorization context.
    let session = sessions.login("admin", "password123").unwrap();
    store
        .session_changed(Notice::LoginSucceeded {
            username: session.username.clone(),
        })
        .await
        .unwrap();
    assert_eq!(
        db.read().await.last_authorization.as_deref(),
        Some("Bearer tok-it")
    );
    assert_eq!(
        store.take_message(),
        Some(Notice::LoginSucceeded {
            username: "admin".to_string()
        })
    );

    // Logout drops the header again.
    sessions.logout();
    store.session_changed(Notice::LoggedOut).await.unwrap();
    assert!(db.read().await.last_authorization.is_none());
}

#[tokio::test]
async fn phase_transitions_observed_over_real_http() {
    init_tracing();
    let (base_url, _db) = start_server().await;
    let config = ClientConfig::new(&base_url);
    let mut store = PostStore::with_http(&config, sessions()).unwrap();

    let mut changes = store.subscribe();
    store.refresh_all().await.unwrap();
    assert_eq!(changes.try_recv().unwrap(), StateChange::Loading);
    assert_eq!(changes.try_recv().unwrap(), StateChange::Settled(Phase::Idle));
}

#[tokio::test]
async fn refused_connection_classifies_as_transient() {
    init_tracing();
    // Bind then drop to get a port with no listener behind it.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::new(format!("http://{addr}/posts"));
    let transport = HttpTransport::new(&config).unwrap();
    let dispatcher = Dispatcher::new(
        transport,
        RetryPolicy {
            limit: 0,
            backoff: Duration::ZERO,
        },
    );
    let client = PostsClient::new(&config.base_url);

    let err = dispatcher.send(&client.build_fetch_all()).await.unwrap_err();
    assert!(matches!(err, ApiError::Transient(_)), "got: {err:?}");
}

#[tokio::test]
async fn dispatcher_with_auth_injector_sends_header_without_store() {
    init_tracing();
    let (base_url, db) = start_server().await;
    let sessions = sessions();
    sessions.login("admin", "password123").unwrap();

    let config = ClientConfig::new(&base_url);
    let transport = HttpTransport::new(&config).unwrap();
    let dispatcher = Dispatcher::new(transport, config.retry)
        .with_interceptor(Box::new(AuthInjector::new(Arc::new(sessions))));
    let client = PostsClient::new(&config.base_url);

    let response = dispatcher.send(&client.build_fetch_all()).await.unwrap();
    let posts = client.parse_fetch_all(response).unwrap();
    assert!(posts.is_empty());
    assert_eq!(
        db.read().await.last_authorization.as_deref(),
        Some("Bearer tok-it")
    );
}
