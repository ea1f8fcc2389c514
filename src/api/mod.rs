//! HTTP API

pub mod auth;
pub mod comments;
pub mod geocode;
pub mod middleware;
pub mod posts;
pub mod spots;
pub mod tips;
pub mod upload;
pub mod users;
pub mod weather;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub use middleware::{ApiError, AppState, CurrentUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Multipart overhead on top of the configured file size cap
    let upload_body_limit = state.upload_config.max_file_size as usize + 64 * 1024;

    // Routes that require a valid session
    let protected_routes = Router::new()
        .route("/users/me", put(users::update_me))
        .route("/posts", post(posts::create))
        .route("/posts/{id}", put(posts::update))
        .route("/posts/{id}", delete(posts::delete))
        .route("/posts/{id}/like", post(posts::toggle_like))
        .route("/posts/{id}/comments", post(comments::create))
        .route("/comments/{id}", put(comments::update))
        .route("/comments/{id}", delete(comments::delete))
        .route("/spots/{id}/tips", post(tips::create))
        .route("/tips/{id}", put(tips::update))
        .route("/tips/{id}", delete(tips::delete))
        .route(
            "/upload",
            post(upload::upload).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes; the viewer is attached when a session is present so
    // responses can be personalized
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/users/me", get(users::me))
        .route("/spots", get(spots::list))
        .route("/spots", post(spots::create))
        .route("/spots/{id}", get(spots::get))
        .route("/spots/{id}/tips", get(tips::list_for_spot))
        .route("/posts", get(posts::list))
        .route("/posts/{id}", get(posts::get))
        .route("/posts/{id}/comments", get(comments::list_for_post))
        .route("/weather", get(weather::get))
        .route("/geocode", get(geocode::search))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ))
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .nest("/api", build_api_router(state.clone()))
        .nest_service(
            "/uploads",
            ServeDir::new(state.upload_config.path.clone()),
        )
        .layer(cors)
        .with_state(state)
}
