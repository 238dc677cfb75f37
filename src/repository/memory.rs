//! Process-local post store. Data is lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::PostRepository;
use crate::{
    error::ApiError,
    models::post::{NewPost, Post},
};

struct Store {
    rows: BTreeMap<i64, Post>,
    next_id: i64,
}

/// In-memory `PostRepository` with the same id and ordering semantics as the
/// `posts` table: ids start at 1, increase monotonically and are never reused.
pub struct InMemoryPostRepository {
    store: RwLock<Store>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, post: NewPost) -> Result<Post, ApiError> {
        let mut store = self.store.write().await;
        let id = store.next_id;
        store.next_id += 1;

        let stored = Post {
            id,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            updated_at: post.updated_at,
        };
        store.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, ApiError> {
        let store = self.store.read().await;
        Ok(store.rows.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Post>, ApiError> {
        let store = self.store.read().await;
        Ok(store.rows.values().cloned().collect())
    }

    async fn save(&self, post: &Post) -> Result<Option<Post>, ApiError> {
        let mut store = self.store.write().await;
        let Some(existing) = store.rows.get_mut(&post.id) else {
            return Ok(None);
        };

        existing.title = post.title.clone();
        existing.content = post.content.clone();
        existing.updated_at = post.updated_at;
        Ok(Some(existing.clone()))
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ApiError> {
        let mut store = self.store.write().await;
        store.rows.remove(&id);
        Ok(())
    }
}
