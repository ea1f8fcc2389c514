//! Surf spot model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a spot record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotSource {
    /// Seeded from a curated dataset
    Seed,
    /// Submitted through the API
    User,
}

impl std::fmt::Display for SpotSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seed => write!(f, "seed"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for SpotSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "seed" => Ok(Self::Seed),
            "user" => Ok(Self::User),
            _ => Err(format!("Invalid spot source: {}", s)),
        }
    }
}

/// Surf spot entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfSpot {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub region: Option<String>,
    pub source: SpotSource,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a surf spot
#[derive(Debug, Clone, Deserialize)]
pub struct NewSpot {
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub region: Option<String>,
}
