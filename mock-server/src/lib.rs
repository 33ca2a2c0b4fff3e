//! In-memory mock of the posts REST API, for integration tests and demos.
//!
//! Ids are assigned sequentially on create, the way the real API does.
//! The state also records the `Authorization` header of the most recent
//! request so tests can assert what the client actually sent; inject the
//! state with [`app_with_state`] to inspect it in-process.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    #[serde(rename = "userId")]
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub body: String,
}

#[derive(Deserialize)]
pub struct CreatePost {
    #[serde(rename = "userId")]
    pub user_id: u64,
    pub title: String,
    pub body: String,
}

/// PUT payload. The id in the path wins; a client-sent id is ignored.
#[derive(Deserialize)]
pub struct UpdatePost {
    #[serde(rename = "userId")]
    pub user_id: u64,
    pub title: String,
    pub body: String,
}

pub struct AppState {
    pub posts: BTreeMap<u64, Post>,
    pub next_id: u64,
    /// `Authorization` header of the most recent request, if it had one.
    pub last_authorization: Option<String>,
    pub requests_seen: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            posts: BTreeMap::new(),
            next_id: 1,
            last_authorization: None,
            requests_seen: 0,
        }
    }
}

pub type Db = Arc<RwLock<AppState>>;

pub fn new_db() -> Db {
    Arc::new(RwLock::new(AppState::default()))
}

/// Preload posts; subsequent creates continue after the highest seeded id.
pub async fn seed(db: &Db, posts: Vec<Post>) {
    let mut state = db.write().await;
    for post in posts {
        state.next_id = state.next_id.max(post.id + 1);
        state.posts.insert(post.id, post);
    }
}

pub fn app() -> Router {
    app_with_state(new_db())
}

pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Serve with an injected state handle, so the caller can seed posts and
/// inspect recorded requests while the server runs.
pub async fn run_with_state(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(db)).await
}

fn record_request(state: &mut AppState, headers: &HeaderMap) {
    state.requests_seen += 1;
    state.last_authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
}

async fn list_posts(State(db): State<Db>, headers: HeaderMap) -> Json<Vec<Post>> {
    let mut state = db.write().await;
    record_request(&mut state, &headers);
    Json(state.posts.values().cloned().collect())
}

async fn create_post(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreatePost>,
) -> (StatusCode, Json<Post>) {
    let mut state = db.write().await;
    record_request(&mut state, &headers);
    let post = Post {
        user_id: input.user_id,
        id: state.next_id,
        title: input.title,
        body: input.body,
    };
    state.next_id += 1;
    state.posts.insert(post.id, post.clone());
    (StatusCode::CREATED, Json(post))
}

async fn get_post(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Post>, StatusCode> {
    let mut state = db.write().await;
    record_request(&mut state, &headers);
    state
        .posts
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_post(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(input): Json<UpdatePost>,
) -> Result<Json<Post>, StatusCode> {
    let mut state = db.write().await;
    record_request(&mut state, &headers);
    let post = state.posts.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    post.user_id = input.user_id;
    post.title = input.title;
    post.body = input.body;
    Ok(Json(post.clone()))
}

async fn delete_post(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<StatusCode, StatusCode> {
    let mut state = db.write().await;
    record_request(&mut state, &headers);
    state
        .posts
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}
