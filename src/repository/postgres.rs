use async_trait::async_trait;
use tokio_postgres::Row;
use tracing::{debug, info};

use super::PostRepository;
use crate::{
    db::Database,
    error::ApiError,
    models::post::{NewPost, Post},
};

const POST_COLUMNS: &str = "id, title, content, created_at, updated_at";

/// `posts` table access over the shared connection pool.
#[derive(Clone)]
pub struct PgPostRepository {
    db: Database,
}

impl PgPostRepository {
    pub fn new(db: Database) -> Self {
        PgPostRepository { db }
    }
}

fn post_from_row(row: &Row) -> Post {
    Post {
        id: row.get(0),
        title: row.get(1),
        content: row.get(2),
        created_at: row.get(3),
        updated_at: row.get(4),
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn insert(&self, post: NewPost) -> Result<Post, ApiError> {
        let client = self.db.get_connection().await?;

        let query = format!(
            "INSERT INTO posts (title, content, created_at, updated_at) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            POST_COLUMNS
        );

        let row = client
            .query_one(
                &query,
                &[&post.title, &post.content, &post.created_at, &post.updated_at],
            )
            .await?;

        let created = post_from_row(&row);
        info!("Inserted post with id: {}", created.id);
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, ApiError> {
        let client = self.db.get_connection().await?;
        let query = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);

        let row = client.query_opt(&query, &[&id]).await?;

        Ok(row.as_ref().map(post_from_row))
    }

    async fn find_all(&self) -> Result<Vec<Post>, ApiError> {
        let client = self.db.get_connection().await?;
        let query = format!("SELECT {} FROM posts ORDER BY id ASC", POST_COLUMNS);

        let rows = client.query(&query, &[]).await?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn save(&self, post: &Post) -> Result<Option<Post>, ApiError> {
        let client = self.db.get_connection().await?;

        let query = format!(
            "UPDATE posts SET title = $1, content = $2, updated_at = $3 \
             WHERE id = $4 RETURNING {}",
            POST_COLUMNS
        );

        let row = client
            .query_opt(&query, &[&post.title, &post.content, &post.updated_at, &post.id])
            .await?;

        if let Some(ref row) = row {
            info!("Updated post with id: {}", post.id);
            Ok(Some(post_from_row(row)))
        } else {
            Ok(None)
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ApiError> {
        let client = self.db.get_connection().await?;

        let rows_affected = client
            .execute("DELETE FROM posts WHERE id = $1", &[&id])
            .await?;

        if rows_affected == 0 {
            debug!("Delete of post {} matched no rows", id);
        } else {
            info!("Deleted post with id: {}", id);
        }
        Ok(())
    }
}
