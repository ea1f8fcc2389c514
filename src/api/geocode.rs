//! Geocoding proxy handler

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct GeocodeQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/geocode?q=..
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<GeocodeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state.geocode_service.search(&query.q).await?;
    Ok(Json(json!({ "results": results })))
}
