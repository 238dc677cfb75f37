use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

/// Post entity as stored in the `posts` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insert payload for a post that has not been assigned an id yet
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Request body accepted by create and update.
/// Unknown fields such as `id` or `createdAt` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct PostRequest {
    pub title: String,
    pub content: String,
}

/// Response body returned for every operation yielding a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Current local time at the resolution of a PostgreSQL `TIMESTAMP` column.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}

impl NewPost {
    /// Build the insert payload with both timestamps set to `at`
    pub fn new(title: String, content: String, at: NaiveDateTime) -> Self {
        NewPost {
            title,
            content,
            created_at: at,
            updated_at: at,
        }
    }
}

impl Post {
    /// Replace the editable fields and refresh `updated_at`.
    /// `updated_at` never moves backwards, even if the wall clock does.
    /// Since `updated_at >= created_at` already holds, so does the new value.
    pub fn apply(&mut self, request: PostRequest, at: NaiveDateTime) {
        self.title = request.title;
        self.content = request.content;
        self.updated_at = at.max(self.updated_at);
    }
}

impl PostRequest {
    pub fn into_new_post(self, at: NaiveDateTime) -> NewPost {
        NewPost::new(self.title, self.content, at)
    }
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        PostResponse {
            id: post.id,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Timelike};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_micro_opt(h, m, s, 123_456)
            .unwrap()
    }

    fn sample_post() -> Post {
        Post {
            id: 7,
            title: "Original Title".to_string(),
            content: "Original content".to_string(),
            created_at: at(9, 30, 0),
            updated_at: at(9, 30, 0),
        }
    }

    #[test]
    fn test_new_post_sets_equal_timestamps() {
        let post = NewPost::new("Title".to_string(), "Body".to_string(), at(8, 0, 0));

        assert_eq!(post.title, "Title");
        assert_eq!(post.content, "Body");
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn test_apply_replaces_fields_and_keeps_identity() {
        let mut post = sample_post();
        let later = at(10, 0, 0);

        post.apply(
            PostRequest {
                title: "Updated Title".to_string(),
                content: "Updated content".to_string(),
            },
            later,
        );

        assert_eq!(post.id, 7);
        assert_eq!(post.title, "Updated Title");
        assert_eq!(post.content, "Updated content");
        assert_eq!(post.created_at, at(9, 30, 0));
        assert_eq!(post.updated_at, later);
    }

    #[test]
    fn test_apply_never_moves_updated_at_before_created_at() {
        let mut post = sample_post();

        post.apply(
            PostRequest {
                title: "t".to_string(),
                content: "c".to_string(),
            },
            at(9, 30, 0) - Duration::hours(1),
        );

        assert_eq!(post.updated_at, post.created_at);
    }

    #[test]
    fn test_apply_never_moves_updated_at_backwards() {
        let mut post = sample_post();
        let edit = |title: &str| PostRequest {
            title: title.to_string(),
            content: "c".to_string(),
        };

        post.apply(edit("first"), at(11, 50, 0));
        // Clock stepped back to a time between created_at and the last edit
        post.apply(edit("second"), at(10, 10, 0));

        assert_eq!(post.title, "second");
        assert_eq!(post.updated_at, at(11, 50, 0));
        assert!(post.updated_at >= post.created_at);
    }

    #[test]
    fn test_now_has_microsecond_resolution() {
        let value = now();
        assert_eq!(value.nanosecond() % 1_000, 0);
    }

    #[test]
    fn test_response_serialization() {
        let response = PostResponse::from(sample_post());

        let json = serde_json::to_string(&response).expect("Failed to serialize response");
        let expected = r#"{"id":7,"title":"Original Title","content":"Original content","createdAt":"2024-05-01T09:30:00.123456","updatedAt":"2024-05-01T09:30:00.123456"}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_request_ignores_server_owned_fields() {
        let json = r#"{"id":99,"title":"Hello","content":"World","createdAt":"2000-01-01T00:00:00"}"#;
        let request: PostRequest = serde_json::from_str(json).expect("Failed to deserialize request");

        assert_eq!(request.title, "Hello");
        assert_eq!(request.content, "World");
    }

    #[test]
    fn test_request_requires_title_and_content() {
        assert!(serde_json::from_str::<PostRequest>(r#"{"title":"only title"}"#).is_err());
        assert!(serde_json::from_str::<PostRequest>(r#"{"content":"only content"}"#).is_err());
        assert!(serde_json::from_str::<PostRequest>(r#"{"title":null,"content":"x"}"#).is_err());
    }

    #[test]
    fn test_request_accepts_empty_strings() {
        let request: PostRequest =
            serde_json::from_str(r#"{"title":"","content":""}"#).expect("Failed to deserialize request");

        assert!(request.title.is_empty());
        assert!(request.content.is_empty());
    }
}
