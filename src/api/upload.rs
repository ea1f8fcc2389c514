//! Image upload handler
//!
//! Accepts a single multipart `file` field, stores it under a random
//! name, and returns the public URL served by the static uploads route.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::api::middleware::{ApiError, AppState};

/// POST /api/upload
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let config = &state.upload_config;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::validation_error("Malformed multipart body"))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .ok_or_else(|| ApiError::validation_error("Missing file content type"))?;
        if !config.is_type_allowed(&content_type) {
            return Err(ApiError::validation_error(format!(
                "File type {} is not allowed",
                content_type
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|_| ApiError::validation_error("Failed to read file data"))?;
        if data.is_empty() {
            return Err(ApiError::validation_error("Uploaded file is empty"));
        }
        if data.len() as u64 > config.max_file_size {
            return Err(ApiError::validation_error(format!(
                "File exceeds the {} byte limit",
                config.max_file_size
            )));
        }

        let filename = format!(
            "{}.{}",
            Uuid::new_v4(),
            config.get_extension(&content_type)
        );
        let path = config.path.join(&filename);

        tokio::fs::create_dir_all(&config.path)
            .await
            .map_err(|e| storage_error("Failed to create upload directory", e))?;
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| storage_error("Failed to write upload", e))?;

        tracing::info!("Stored upload {} ({} bytes)", filename, data.len());
        return Ok((
            StatusCode::CREATED,
            Json(json!({
                "url": format!("/uploads/{}", filename),
                "filename": filename,
                "size": data.len(),
                "content_type": content_type,
            })),
        ));
    }

    Err(ApiError::validation_error("Missing file field"))
}

fn storage_error(context: &str, e: std::io::Error) -> ApiError {
    tracing::error!("{}: {}", context, e);
    ApiError::internal_error("Internal server error")
}
