use std::sync::Arc;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    models::post::{now, PostRequest, PostResponse},
    repository::PostRepository,
};

/// Business rules for posts: timestamp ownership and existence checks.
#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        PostService { repo }
    }

    pub async fn list_all(&self) -> ApiResult<Vec<PostResponse>> {
        let posts = self.repo.find_all().await?;
        Ok(posts.into_iter().map(PostResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: i64) -> ApiResult<PostResponse> {
        let post = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(id))?;

        Ok(post.into())
    }

    /// Both timestamps are taken from a single clock reading.
    pub async fn create(&self, request: PostRequest) -> ApiResult<PostResponse> {
        let stored = self.repo.insert(request.into_new_post(now())).await?;

        info!("Created post with id: {}", stored.id);
        Ok(stored.into())
    }

    pub async fn update(&self, id: i64, request: PostRequest) -> ApiResult<PostResponse> {
        let mut post = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(id))?;

        post.apply(request, now());

        // The row may have been deleted between the read and the write
        let saved = self
            .repo
            .save(&post)
            .await?
            .ok_or(ApiError::NotFound(id))?;

        info!("Updated post with id: {}", saved.id);
        Ok(saved.into())
    }

    /// Deleting an id that does not exist is not an error.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.repo.delete_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::post::{NewPost, Post};
    use crate::repository::InMemoryPostRepository;
    use async_trait::async_trait;
    use tokio_test::{assert_err, assert_ok};

    fn service() -> PostService {
        PostService::new(Arc::new(InMemoryPostRepository::new()))
    }

    fn request(title: &str, content: &str) -> PostRequest {
        PostRequest {
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let service = service();

        let created = service.create(request("Hello", "World")).await.unwrap();
        let fetched = service.get_by_id(created.id).await.unwrap();

        assert_eq!(fetched.title, "Hello");
        assert_eq!(fetched.content, "World");
        assert_eq!(fetched.created_at, fetched.updated_at);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_created_at() {
        let service = service();
        let original = service.create(request("v1", "first")).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let updated = service
            .update(original.id, request("v2", "second"))
            .await
            .unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.title, "v2");
        assert_eq!(updated.content, "second");
        assert!(updated.updated_at >= original.updated_at);

        let fetched = service.get_by_id(original.id).await.unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let service = service();
        let created = service.create(request("gone", "soon")).await.unwrap();

        assert_ok!(service.delete(created.id).await);
        assert_ok!(service.delete(created.id).await);

        let err = assert_err!(service.get_by_id(created.id).await);
        assert!(matches!(err, ApiError::NotFound(id) if id == created.id));
    }

    #[tokio::test]
    async fn test_list_reflects_creates_and_deletes() {
        let service = service();
        assert!(service.list_all().await.unwrap().is_empty());

        let mut ids = Vec::new();
        for i in 0..5 {
            let created = service
                .create(request(&format!("title {}", i), "body"))
                .await
                .unwrap();
            ids.push(created.id);
        }
        service.delete(ids[1]).await.unwrap();
        service.delete(ids[3]).await.unwrap();

        let listed = service.list_all().await.unwrap();
        let listed_ids: Vec<i64> = listed.iter().map(|p| p.id).collect();
        assert_eq!(listed_ids, vec![ids[0], ids[2], ids[4]]);
        assert_eq!(listed[1].title, "title 2");
    }

    #[tokio::test]
    async fn test_missing_id_is_not_found() {
        let service = service();

        let err = assert_err!(service.get_by_id(404).await);
        assert!(matches!(err, ApiError::NotFound(404)));

        let err = assert_err!(service.update(404, request("x", "y")).await);
        assert!(matches!(err, ApiError::NotFound(404)));
    }

    /// Repository whose rows vanish between the read and the write-back
    struct VanishingRepository {
        inner: InMemoryPostRepository,
    }

    #[async_trait]
    impl PostRepository for VanishingRepository {
        async fn insert(&self, post: NewPost) -> Result<Post, ApiError> {
            self.inner.insert(post).await
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Post>, ApiError> {
            self.inner.find_by_id(id).await
        }

        async fn find_all(&self) -> Result<Vec<Post>, ApiError> {
            self.inner.find_all().await
        }

        async fn save(&self, post: &Post) -> Result<Option<Post>, ApiError> {
            self.inner.delete_by_id(post.id).await?;
            self.inner.save(post).await
        }

        async fn delete_by_id(&self, id: i64) -> Result<(), ApiError> {
            self.inner.delete_by_id(id).await
        }
    }

    #[tokio::test]
    async fn test_update_of_concurrently_deleted_row_is_not_found() {
        let service = PostService::new(Arc::new(VanishingRepository {
            inner: InMemoryPostRepository::new(),
        }));
        let created = service.create(request("race", "me")).await.unwrap();

        let err = assert_err!(service.update(created.id, request("x", "y")).await);
        assert!(matches!(err, ApiError::NotFound(id) if id == created.id));
    }

    /// Repository standing in for an unreachable database
    struct BrokenRepository;

    #[async_trait]
    impl PostRepository for BrokenRepository {
        async fn insert(&self, _post: NewPost) -> Result<Post, ApiError> {
            Err(ApiError::Database("Database connection unavailable".to_string()))
        }

        async fn find_by_id(&self, _id: i64) -> Result<Option<Post>, ApiError> {
            Err(ApiError::Database("Database connection unavailable".to_string()))
        }

        async fn find_all(&self) -> Result<Vec<Post>, ApiError> {
            Err(ApiError::Database("Database connection unavailable".to_string()))
        }

        async fn save(&self, _post: &Post) -> Result<Option<Post>, ApiError> {
            Err(ApiError::Database("Database connection unavailable".to_string()))
        }

        async fn delete_by_id(&self, _id: i64) -> Result<(), ApiError> {
            Err(ApiError::Database("Database connection unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_infrastructure_errors_propagate_unchanged() {
        let service = PostService::new(Arc::new(BrokenRepository));

        assert!(matches!(service.list_all().await, Err(ApiError::Database(_))));
        assert!(matches!(service.get_by_id(1).await, Err(ApiError::Database(_))));
        assert!(matches!(
            service.create(request("a", "b")).await,
            Err(ApiError::Database(_))
        ));
        assert!(matches!(service.delete(1).await, Err(ApiError::Database(_))));
    }
}
