//! Comment handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, CurrentUser};
use crate::models::NewComment;

/// GET /api/posts/{id}/comments
pub async fn list_for_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = state.comment_service.list_for_post(post_id).await?;
    Ok(Json(json!({ "comments": comments })))
}

/// POST /api/posts/{id}/comments
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(post_id): Path<i64>,
    Json(comment): Json<NewComment>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .comment_service
        .create(&user, post_id, &comment.content)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "comment": comment }))))
}

/// PUT /api/comments/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(comment): Json<NewComment>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .comment_service
        .update(&user, id, &comment.content)
        .await?;
    Ok(Json(json!({ "comment": comment })))
}

/// DELETE /api/comments/{id}
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.comment_service.delete(&user, id).await?;
    Ok(Json(json!({ "message": "Comment deleted" })))
}
