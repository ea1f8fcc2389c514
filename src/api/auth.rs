//! Authentication handlers

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, SESSION_COOKIE};
use crate::services::RegisterInput;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn session_cookie(token: &str, max_age: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE, token, max_age
    )
}

/// POST /api/auth/register
///
/// Registering also opens a session, so the client is logged in
/// immediately.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, token) = state.user_service.register(input).await?;
    let cookie = session_cookie(&token, state.user_service.session_ttl_seconds());

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "user": user, "token": token })),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, token) = state
        .user_service
        .login(&request.username, &request.password)
        .await?;
    let cookie = session_cookie(&token, state.user_service.session_ttl_seconds());

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "user": user, "token": token })),
    ))
}

/// POST /api/auth/logout
///
/// Public on purpose: revoking is idempotent, and a client with a stale
/// token still deserves a clean logout. The response says whether a
/// session was actually revoked.
pub async fn logout(
    State(state): State<AppState>,
    request: Request,
) -> Result<impl IntoResponse, ApiError> {
    let revoked = match super::middleware::extract_session_token(&request) {
        Some(token) => state.user_service.logout(&token).await?,
        None => false,
    };

    let message = if revoked {
        "Logged out"
    } else {
        "Already logged out"
    };
    Ok((
        [(header::SET_COOKIE, session_cookie("", 0))],
        Json(json!({ "message": message })),
    ))
}
