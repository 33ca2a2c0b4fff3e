//! Domain entities and the wire codec for the posts API.
//!
//! # Design
//! These types mirror the server's schema but are defined independently.
//! The wire format uses camelCase keys (`userId`), so the integer fields
//! carry explicit serde renames. `Post::decode` / `Post::encode` are the
//! codec boundary the transport goes through; decoding rejects any record
//! missing a field or carrying the wrong semantic type, encoding is total.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// A single post returned by the API.
///
/// `id` is assigned by the server on creation and never mutated by any
/// client-side operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    #[serde(rename = "userId")]
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub body: String,
}

/// Request payload for creating a new post. The server assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftPost {
    #[serde(rename = "userId")]
    pub user_id: u64,
    pub title: String,
    pub body: String,
}

impl Post {
    /// Decode a wire record into a `Post`.
    ///
    /// Requires integer `userId` and `id` and string `title` and `body`;
    /// a missing field or a wrong semantic type is an `ApiError::Decode`.
    /// Unknown extra keys are ignored.
    pub fn decode(record: &Value) -> Result<Post, ApiError> {
        serde_json::from_value(record.clone()).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Encode a `Post` into its wire record. Total, never fails.
    pub fn encode(&self) -> Value {
        serde_json::json!({
            "userId": self.user_id,
            "id": self.id,
            "title": self.title,
            "body": self.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> Post {
        Post {
            user_id: 1,
            id: 42,
            title: "Hello".to_string(),
            body: "World".to_string(),
        }
    }

    #[test]
    fn encode_produces_wire_keys() {
        let record = post().encode();
        assert_eq!(record["userId"], 1);
        assert_eq!(record["id"], 42);
        assert_eq!(record["title"], "Hello");
        assert_eq!(record["body"], "World");
    }

    #[test]
    fn decode_encode_round_trips() {
        let original = post();
        let back = Post::decode(&original.encode()).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn decode_rejects_missing_field() {
        let record = serde_json::json!({"userId": 1, "id": 2, "title": "t"});
        let err = Post::decode(&record).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn decode_rejects_wrong_type() {
        let record = serde_json::json!({"userId": 1, "id": "2", "title": "t", "body": "b"});
        let err = Post::decode(&record).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn decode_rejects_fractional_id() {
        let record = serde_json::json!({"userId": 1, "id": 2.5, "title": "t", "body": "b"});
        let err = Post::decode(&record).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn decode_ignores_extra_keys() {
        let record =
            serde_json::json!({"userId": 1, "id": 2, "title": "t", "body": "b", "extra": true});
        let post = Post::decode(&record).unwrap();
        assert_eq!(post.id, 2);
    }

    #[test]
    fn draft_post_serializes_user_id_as_camel_case() {
        let draft = DraftPost {
            user_id: 7,
            title: "t".to_string(),
            body: "b".to_string(),
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["userId"], 7);
        assert!(json.get("user_id").is_none());
        assert!(json.get("id").is_none());
    }
}
