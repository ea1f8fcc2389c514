//! Comment repository

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;

use crate::models::{Comment, CommentWithAuthor};

/// Comment persistence operations
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>>;
    async fn insert(&self, post_id: i64, user_id: i64, content: &str) -> Result<Comment>;
    async fn find(&self, id: i64) -> Result<Option<Comment>>;
    async fn update(&self, id: i64, content: &str) -> Result<Option<Comment>>;
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Postgres-backed comment repository
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: PgPool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_comment(row: &PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        user_id: row.get("user_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
        let rows = sqlx::query(
            "SELECT c.id, c.post_id, c.user_id, u.username, c.content, c.created_at \
             FROM comments c JOIN users u ON u.id = c.user_id \
             WHERE c.post_id = $1 ORDER BY c.created_at ASC, c.id ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| CommentWithAuthor {
                id: row.get("id"),
                post_id: row.get("post_id"),
                user_id: row.get("user_id"),
                username: row.get("username"),
                content: row.get("content"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn insert(&self, post_id: i64, user_id: i64, content: &str) -> Result<Comment> {
        let row = sqlx::query(
            "INSERT INTO comments (post_id, user_id, content) VALUES ($1, $2, $3) \
             RETURNING id, post_id, user_id, content, created_at",
        )
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row_to_comment(&row))
    }

    async fn find(&self, id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query(
            "SELECT id, post_id, user_id, content, created_at FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_comment(&r)))
    }

    async fn update(&self, id: i64, content: &str) -> Result<Option<Comment>> {
        let row = sqlx::query(
            "UPDATE comments SET content = $2 WHERE id = $1 \
             RETURNING id, post_id, user_id, content, created_at",
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_comment(&r)))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
