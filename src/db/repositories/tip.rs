//! Spot tip repository

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;

use crate::models::{SpotTip, TipWithAuthor};

/// Spot tip persistence operations
#[async_trait]
pub trait TipRepository: Send + Sync {
    async fn list_for_spot(&self, spot_id: i64) -> Result<Vec<TipWithAuthor>>;
    async fn insert(&self, spot_id: i64, user_id: i64, content: &str) -> Result<SpotTip>;
    async fn find(&self, id: i64) -> Result<Option<SpotTip>>;
    async fn update(&self, id: i64, content: &str) -> Result<Option<SpotTip>>;
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Postgres-backed tip repository
pub struct PgTipRepository {
    pool: PgPool,
}

impl PgTipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: PgPool) -> Arc<dyn TipRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_tip(row: &PgRow) -> SpotTip {
    SpotTip {
        id: row.get("id"),
        spot_id: row.get("spot_id"),
        user_id: row.get("user_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl TipRepository for PgTipRepository {
    async fn list_for_spot(&self, spot_id: i64) -> Result<Vec<TipWithAuthor>> {
        let rows = sqlx::query(
            "SELECT t.id, t.spot_id, t.user_id, u.username, t.content, t.created_at \
             FROM spot_tips t JOIN users u ON u.id = t.user_id \
             WHERE t.spot_id = $1 ORDER BY t.created_at ASC, t.id ASC",
        )
        .bind(spot_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| TipWithAuthor {
                id: row.get("id"),
                spot_id: row.get("spot_id"),
                user_id: row.get("user_id"),
                username: row.get("username"),
                content: row.get("content"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn insert(&self, spot_id: i64, user_id: i64, content: &str) -> Result<SpotTip> {
        let row = sqlx::query(
            "INSERT INTO spot_tips (spot_id, user_id, content) VALUES ($1, $2, $3) \
             RETURNING id, spot_id, user_id, content, created_at",
        )
        .bind(spot_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row_to_tip(&row))
    }

    async fn find(&self, id: i64) -> Result<Option<SpotTip>> {
        let row = sqlx::query(
            "SELECT id, spot_id, user_id, content, created_at FROM spot_tips WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_tip(&r)))
    }

    async fn update(&self, id: i64, content: &str) -> Result<Option<SpotTip>> {
        let row = sqlx::query(
            "UPDATE spot_tips SET content = $2 WHERE id = $1 \
             RETURNING id, spot_id, user_id, content, created_at",
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_tip(&r)))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM spot_tips WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
