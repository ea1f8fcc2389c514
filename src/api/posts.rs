//! Session post handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, CurrentUser};
use crate::models::{NewPost, UpdatePost};

/// GET /api/posts
///
/// Optional auth: `is_liked` reflects the viewer when one is present.
pub async fn list(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
) -> Result<impl IntoResponse, ApiError> {
    let viewer = user.map(|Extension(CurrentUser(user))| user.id);
    let posts = state.post_service.list(viewer).await?;
    Ok(Json(json!({ "posts": posts })))
}

/// GET /api/posts/{id}
pub async fn get(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let viewer = user.map(|Extension(CurrentUser(user))| user.id);
    let post = state.post_service.get(id, viewer).await?;
    Ok(Json(json!({ "post": post })))
}

/// POST /api/posts
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(post): Json<NewPost>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.post_service.create(&user, post).await?;
    Ok((StatusCode::CREATED, Json(json!({ "post": post }))))
}

/// PUT /api/posts/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(update): Json<UpdatePost>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.post_service.update(&user, id, update).await?;
    Ok(Json(json!({ "post": post })))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.post_service.delete(&user, id).await?;
    Ok(Json(json!({ "message": "Post deleted" })))
}

/// POST /api/posts/{id}/like
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state.post_service.toggle_like(&user, id).await?;
    Ok(Json(json!({
        "liked": status.liked,
        "like_count": status.like_count,
    })))
}
