//! Database layer
//!
//! Postgres via sqlx. Repositories are trait objects so services can be
//! wired against either the Postgres implementations or the in-memory
//! ones (tests, volatile single-process deployments).

pub mod migrations;
pub mod repositories;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
pub use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Create the Postgres connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_url())
        .await
        .context("Failed to connect to Postgres")?;

    Ok(pool)
}
