//! Spot tip model
//!
//! Tips are short pieces of local knowledge attached to a surf spot
//! (best tide, where to park, hazards). Structurally they mirror comments
//! but hang off a spot instead of a post.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Spot tip entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotTip {
    pub id: i64,
    pub spot_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Tip with author username for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipWithAuthor {
    pub id: i64,
    pub spot_id: i64,
    pub user_id: i64,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a tip
#[derive(Debug, Clone, Deserialize)]
pub struct NewTip {
    pub content: String,
}
