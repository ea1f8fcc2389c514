//! API middleware
//!
//! Application state, the wire-level error type, and the session
//! authentication middlewares.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::UploadConfig;
use crate::models::User;
use crate::services::geocode::GeocodeError;
use crate::services::weather::ForecastError;
use crate::services::{
    CommentService, CommentServiceError, GeocodeService, PostService, PostServiceError,
    SpotService, SpotServiceError, TipService, TipServiceError, UserService, UserServiceError,
    WeatherService,
};

/// Session cookie name
pub const SESSION_COOKIE: &str = "token";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub spot_service: Arc<SpotService>,
    pub post_service: Arc<PostService>,
    pub comment_service: Arc<CommentService>,
    pub tip_service: Arc<TipService>,
    pub weather_service: Arc<WeatherService>,
    pub geocode_service: Arc<GeocodeService>,
    pub upload_config: Arc<UploadConfig>,
}

/// Authenticated user extracted from the request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn upstream_error(message: impl Into<String>) -> Self {
        Self::new("UPSTREAM_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            "UPSTREAM_ERROR" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

fn internal(context: &str, e: anyhow::Error) -> ApiError {
    tracing::error!("{}: {:#}", context, e);
    ApiError::internal_error("Internal server error")
}

impl From<UserServiceError> for ApiError {
    fn from(e: UserServiceError) -> Self {
        match e {
            UserServiceError::Validation(msg) => ApiError::validation_error(msg),
            UserServiceError::InvalidCredentials => {
                ApiError::forbidden("Invalid username or password")
            }
            UserServiceError::DuplicateUsername => ApiError::conflict("Username is already taken"),
            UserServiceError::DuplicateEmail => ApiError::conflict("Email is already registered"),
            UserServiceError::Internal(e) => internal("User service failure", e),
        }
    }
}

impl From<SpotServiceError> for ApiError {
    fn from(e: SpotServiceError) -> Self {
        match e {
            SpotServiceError::Validation(msg) => ApiError::validation_error(msg),
            SpotServiceError::NotFound => ApiError::not_found("Spot not found"),
            SpotServiceError::Internal(e) => internal("Spot service failure", e),
        }
    }
}

impl From<PostServiceError> for ApiError {
    fn from(e: PostServiceError) -> Self {
        match e {
            PostServiceError::Validation(msg) => ApiError::validation_error(msg),
            PostServiceError::NotFound => ApiError::not_found("Post not found"),
            PostServiceError::Forbidden => ApiError::forbidden("You do not own this post"),
            PostServiceError::Internal(e) => internal("Post service failure", e),
        }
    }
}

impl From<CommentServiceError> for ApiError {
    fn from(e: CommentServiceError) -> Self {
        match e {
            CommentServiceError::Validation(msg) => ApiError::validation_error(msg),
            CommentServiceError::NotFound => ApiError::not_found("Not found"),
            CommentServiceError::Forbidden => ApiError::forbidden("You do not own this comment"),
            CommentServiceError::Internal(e) => internal("Comment service failure", e),
        }
    }
}

impl From<TipServiceError> for ApiError {
    fn from(e: TipServiceError) -> Self {
        match e {
            TipServiceError::Validation(msg) => ApiError::validation_error(msg),
            TipServiceError::NotFound => ApiError::not_found("Not found"),
            TipServiceError::Forbidden => ApiError::forbidden("You do not own this tip"),
            TipServiceError::Internal(e) => internal("Tip service failure", e),
        }
    }
}

impl From<ForecastError> for ApiError {
    fn from(e: ForecastError) -> Self {
        tracing::warn!("Marine API failure: {}", e);
        ApiError::upstream_error("Marine weather service unavailable")
    }
}

impl From<GeocodeError> for ApiError {
    fn from(e: GeocodeError) -> Self {
        tracing::warn!("Geocoding API failure: {}", e);
        ApiError::upstream_error("Geocoding service unavailable")
    }
}

/// Extract the session token from the Authorization header or cookie
pub(crate) fn extract_session_token(request: &Request) -> Option<String> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("token=") {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}

/// Authentication middleware
///
/// A missing or unresolvable token is a 403. A session store failure is a
/// 500; it must never masquerade as "not authenticated".
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(&request)
        .ok_or_else(|| ApiError::forbidden("Authentication required"))?;

    let user = state
        .user_service
        .resolve_session(&token)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::forbidden("Invalid or expired session"))?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Optional authentication middleware
///
/// Attaches the user when a valid token is present; anonymous requests
/// pass through. Store failures still surface as errors.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(token) = extract_session_token(&request) {
        if let Some(user) = state
            .user_service
            .resolve_session(&token)
            .await
            .map_err(ApiError::from)?
        {
            request.extensions_mut().insert(CurrentUser(user));
        }
    }
    Ok(next.run(request).await)
}
