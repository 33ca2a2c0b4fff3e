//! Stateless request builder and response parser for the posts API.
//!
//! # Design
//! `PostsClient` holds only the configured collection endpoint and carries
//! no mutable state between calls. Each CRUD operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. The `Dispatcher` executes the round
//! trip between the two, so status interpretation and decoding stay
//! deterministic and free of I/O.
//!
//! Success codes follow the API contract: GET and PUT expect 200, POST
//! expects 201, DELETE accepts 200 or 204. A 404 on lookup-by-id is a
//! modeled absence, not an error.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{DraftPost, Post};

/// Stateless client for the posts collection endpoint.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct PostsClient {
    base_url: String,
}

impl PostsClient {
    /// `base_url` is the collection endpoint itself, e.g.
    /// `https://example.com/posts`. A trailing slash is stripped.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_fetch_all(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.base_url.clone(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_fetch_by_id(&self, id: u64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create(&self, draft: &DraftPost) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(draft).map_err(|e| ApiError::Encode(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.base_url.clone(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    /// PUT carries all four fields, id included.
    pub fn build_update(&self, post: &Post) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(post).map_err(|e| ApiError::Encode(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            url: format!("{}/{}", self.base_url, post.id),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_remove(&self, id: u64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: format!("{}/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Success is exactly HTTP 200 with an array body, decoded element-wise.
    /// A single undecodable element aborts the whole call.
    pub fn parse_fetch_all(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        check_status(&response, &[200])?;
        let records: Vec<serde_json::Value> =
            serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))?;
        records.iter().map(Post::decode).collect()
    }

    /// HTTP 200 decodes to a post; HTTP 404 is a modeled absence, never an
    /// error. Anything else is `ApiError::Server`.
    pub fn parse_fetch_by_id(&self, response: HttpResponse) -> Result<Option<Post>, ApiError> {
        if response.status == 404 {
            return Ok(None);
        }
        check_status(&response, &[200])?;
        decode_single(&response.body).map(Some)
    }

    /// Success is HTTP 201; the body carries the server-assigned post.
    pub fn parse_create(&self, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response, &[201])?;
        decode_single(&response.body)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response, &[200])?;
        decode_single(&response.body)
    }

    /// DELETE succeeds on 200 or 204, with no body expected either way.
    pub fn parse_remove(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[200, 204])
    }
}

fn decode_single(body: &str) -> Result<Post, ApiError> {
    let record: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    Post::decode(&record)
}

/// Map any status outside `expected` to `ApiError::Server`.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    Err(ApiError::server(response.status, &response.body))
}
