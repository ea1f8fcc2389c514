//! Surf spot repository

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;

use crate::models::{NewSpot, SpotSource, SurfSpot};

/// Listing filters
#[derive(Debug, Clone, Default)]
pub struct SpotFilter {
    /// Case-insensitive substring match on the spot name
    pub q: Option<String>,
    /// Case-insensitive exact match on the region
    pub region: Option<String>,
}

/// Surf spot persistence operations
#[async_trait]
pub trait SpotRepository: Send + Sync {
    async fn insert(
        &self,
        spot: NewSpot,
        source: SpotSource,
        created_by: Option<i64>,
    ) -> Result<SurfSpot>;
    async fn find(&self, id: i64) -> Result<Option<SurfSpot>>;
    async fn list(&self, filter: &SpotFilter) -> Result<Vec<SurfSpot>>;
}

/// Postgres-backed spot repository
pub struct PgSpotRepository {
    pool: PgPool,
}

impl PgSpotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: PgPool) -> Arc<dyn SpotRepository> {
        Arc::new(Self::new(pool))
    }
}

const SPOT_COLUMNS: &str =
    "id, name, description, latitude, longitude, country, region, source, created_by, created_at";

fn row_to_spot(row: &PgRow) -> Result<SurfSpot> {
    let source: String = row.get("source");
    Ok(SurfSpot {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        country: row.get("country"),
        region: row.get("region"),
        source: source
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?,
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl SpotRepository for PgSpotRepository {
    async fn insert(
        &self,
        spot: NewSpot,
        source: SpotSource,
        created_by: Option<i64>,
    ) -> Result<SurfSpot> {
        let row = sqlx::query(&format!(
            "INSERT INTO surf_spots \
                 (name, description, latitude, longitude, country, region, source, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {SPOT_COLUMNS}"
        ))
        .bind(&spot.name)
        .bind(&spot.description)
        .bind(spot.latitude)
        .bind(spot.longitude)
        .bind(&spot.country)
        .bind(&spot.region)
        .bind(source.to_string())
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        row_to_spot(&row)
    }

    async fn find(&self, id: i64) -> Result<Option<SurfSpot>> {
        let row = sqlx::query(&format!(
            "SELECT {SPOT_COLUMNS} FROM surf_spots WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_spot(&r)).transpose()
    }

    async fn list(&self, filter: &SpotFilter) -> Result<Vec<SurfSpot>> {
        let rows = sqlx::query(&format!(
            "SELECT {SPOT_COLUMNS} FROM surf_spots \
             WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%') \
               AND ($2::text IS NULL OR LOWER(region) = LOWER($2)) \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(&filter.q)
        .bind(&filter.region)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_spot).collect()
    }
}
