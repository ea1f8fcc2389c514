//! Spot tip handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, CurrentUser};
use crate::models::NewTip;

/// GET /api/spots/{id}/tips
pub async fn list_for_spot(
    State(state): State<AppState>,
    Path(spot_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let tips = state.tip_service.list_for_spot(spot_id).await?;
    Ok(Json(json!({ "tips": tips })))
}

/// POST /api/spots/{id}/tips
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(spot_id): Path<i64>,
    Json(tip): Json<NewTip>,
) -> Result<impl IntoResponse, ApiError> {
    let tip = state.tip_service.create(&user, spot_id, &tip.content).await?;
    Ok((StatusCode::CREATED, Json(json!({ "tip": tip }))))
}

/// PUT /api/tips/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(tip): Json<NewTip>,
) -> Result<impl IntoResponse, ApiError> {
    let tip = state.tip_service.update(&user, id, &tip.content).await?;
    Ok(Json(json!({ "tip": tip })))
}

/// DELETE /api/tips/{id}
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.tip_service.delete(&user, id).await?;
    Ok(Json(json!({ "message": "Tip deleted" })))
}
