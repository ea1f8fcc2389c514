//! Post repository

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;

use crate::models::{NewPost, Post, PostWithMeta, UpdatePost};

/// Result of toggling a like
#[derive(Debug, Clone, Serialize)]
pub struct LikeStatus {
    pub liked: bool,
    pub like_count: i64,
}

/// Post persistence operations
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, user_id: i64, post: NewPost) -> Result<Post>;
    async fn find(&self, id: i64) -> Result<Option<Post>>;
    async fn find_with_meta(&self, id: i64, viewer: Option<i64>) -> Result<Option<PostWithMeta>>;
    async fn list(&self, viewer: Option<i64>) -> Result<Vec<PostWithMeta>>;
    async fn update(&self, id: i64, update: UpdatePost) -> Result<Option<Post>>;
    async fn delete(&self, id: i64) -> Result<bool>;
    /// Add the user's like if absent, remove it if present.
    async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<LikeStatus>;
}

/// Postgres-backed post repository
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: PgPool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

const POST_COLUMNS: &str = "id, user_id, title, content, image_url, created_at";

const POST_META_QUERY: &str = "SELECT p.id, p.user_id, u.username, p.title, p.content, \
         p.image_url, p.created_at, \
         (SELECT COUNT(*) FROM post_likes pl WHERE pl.post_id = p.id) AS like_count, \
         EXISTS( \
             SELECT 1 FROM post_likes pl \
             WHERE pl.post_id = p.id AND pl.user_id = $1 \
         ) AS is_liked \
     FROM posts p JOIN users u ON u.id = p.user_id";

fn row_to_post(row: &PgRow) -> Post {
    Post {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        content: row.get("content"),
        image_url: row.get("image_url"),
        created_at: row.get("created_at"),
    }
}

fn row_to_post_with_meta(row: &PgRow) -> PostWithMeta {
    PostWithMeta {
        id: row.get("id"),
        user_id: row.get("user_id"),
        username: row.get("username"),
        title: row.get("title"),
        content: row.get("content"),
        image_url: row.get("image_url"),
        like_count: row.get("like_count"),
        is_liked: row.get("is_liked"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn insert(&self, user_id: i64, post: NewPost) -> Result<Post> {
        let row = sqlx::query(&format!(
            "INSERT INTO posts (user_id, title, content, image_url) \
             VALUES ($1, $2, $3, $4) RETURNING {POST_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(row_to_post(&row))
    }

    async fn find(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| row_to_post(&r)))
    }

    async fn find_with_meta(&self, id: i64, viewer: Option<i64>) -> Result<Option<PostWithMeta>> {
        let row = sqlx::query(&format!("{POST_META_QUERY} WHERE p.id = $2"))
            .bind(viewer)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| row_to_post_with_meta(&r)))
    }

    async fn list(&self, viewer: Option<i64>) -> Result<Vec<PostWithMeta>> {
        let rows = sqlx::query(&format!(
            "{POST_META_QUERY} ORDER BY p.created_at DESC, p.id DESC"
        ))
        .bind(viewer)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_post_with_meta).collect())
    }

    async fn update(&self, id: i64, update: UpdatePost) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "UPDATE posts SET title = $2, content = $3, image_url = $4 \
             WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .bind(&update.title)
        .bind(&update.content)
        .bind(&update.image_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_post(&r)))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<LikeStatus> {
        let inserted = sqlx::query(
            "INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (post_id, user_id) DO NOTHING",
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        let liked = if inserted > 0 {
            true
        } else {
            sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
                .bind(post_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
            false
        };

        let row = sqlx::query("SELECT COUNT(*) AS like_count FROM post_likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(LikeStatus {
            liked,
            like_count: row.get("like_count"),
        })
    }
}
