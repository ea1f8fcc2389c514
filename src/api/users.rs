//! Current-user handlers

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, CurrentUser};
use crate::models::ProfileUpdate;

/// GET /api/users/me
///
/// Optional auth: anonymous callers get `{"user": null}` rather than an
/// error so the frontend can probe login state with one request.
pub async fn me(user: Option<Extension<CurrentUser>>) -> impl IntoResponse {
    match user {
        Some(Extension(CurrentUser(user))) => Json(json!({ "user": user })),
        None => Json(json!({ "user": null })),
    }
}

/// PUT /api/users/me
pub async fn update_me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(update): Json<ProfileUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state.user_service.update_profile(user.id, update).await?;
    Ok(Json(json!({ "user": updated })))
}
