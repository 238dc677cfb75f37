// Persistence layer for posts

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    error::ApiError,
    models::post::{NewPost, Post},
};

pub use memory::InMemoryPostRepository;
pub use postgres::PgPostRepository;

/// Storage contract for post records keyed by their generated id.
///
/// Every method is a single atomic unit against the store. Infrastructure
/// failures are reported as `ApiError::Database`; absence is never an error
/// at this layer.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a new record. The store assigns the id.
    async fn insert(&self, post: NewPost) -> Result<Post, ApiError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, ApiError>;

    /// Every stored record in ascending id order.
    async fn find_all(&self) -> Result<Vec<Post>, ApiError>;

    /// Write back a mutated record keyed by its existing id.
    /// `created_at` is never overwritten. Returns `None` when the row is gone.
    async fn save(&self, post: &Post) -> Result<Option<Post>, ApiError>;

    /// Remove the record if present; a missing id is a no-op.
    async fn delete_by_id(&self, id: i64) -> Result<(), ApiError>;
}
