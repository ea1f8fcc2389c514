//! Session repository
//!
//! Sessions map an opaque token to a username. Any database failure here
//! must surface as an error to the caller; a broken session store is an
//! internal failure, not a missing session.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;

use crate::models::Session;

/// Session persistence operations
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<()>;
    async fn get(&self, token: &str) -> Result<Option<Session>>;
    /// Delete a session; returns whether a row existed.
    async fn delete(&self, token: &str) -> Result<bool>;
    /// Remove expired sessions; returns how many were deleted.
    async fn delete_expired(&self) -> Result<u64>;
}

/// Postgres-backed session repository
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: PgPool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_session(row: &PgRow) -> Session {
    Session {
        token: row.get("token"),
        username: row.get("username"),
        created_at: row.get("created_at"),
        expires_at: row.get("expires_at"),
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, session: &Session) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (token, username, created_at, expires_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&session.token)
        .bind(&session.username)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<Session>> {
        let row = sqlx::query(
            "SELECT token, username, created_at, expires_at FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_session(&r)))
    }

    async fn delete(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < now()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
