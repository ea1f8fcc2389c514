//! Surf spot handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, CurrentUser};
use crate::db::repositories::SpotFilter;
use crate::models::NewSpot;

#[derive(Debug, Default, Deserialize)]
pub struct SpotListQuery {
    pub q: Option<String>,
    pub region: Option<String>,
}

/// GET /api/spots
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SpotListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = SpotFilter {
        q: query.q,
        region: query.region,
    };
    let spots = state.spot_service.list(&filter).await?;
    Ok(Json(json!({ "spots": spots })))
}

/// GET /api/spots/{id}
///
/// The marine forecast rides along; if the upstream is down the spot
/// still renders with `"weather": null`.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let (spot, weather) = state.spot_service.get_with_weather(id).await?;
    Ok(Json(json!({ "spot": spot, "weather": weather })))
}

/// POST /api/spots
///
/// Anonymous submissions are allowed; a logged-in caller is recorded as
/// the creator.
pub async fn create(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Json(spot): Json<NewSpot>,
) -> Result<impl IntoResponse, ApiError> {
    let created_by = user.map(|Extension(CurrentUser(user))| user.id);
    let spot = state.spot_service.create(spot, created_by).await?;
    Ok((StatusCode::CREATED, Json(json!({ "spot": spot }))))
}
