//! Standalone marine weather handler

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::services::spot::validate_coordinates;

/// Coordinates arrive as raw strings: the unparsed text is the cache
/// key, so "33.5" and "33.50" are distinct entries.
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub lat: String,
    pub lon: String,
}

/// GET /api/weather?lat=..&lon=..
pub async fn get(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let latitude: f64 = query
        .lat
        .trim()
        .parse()
        .map_err(|_| ApiError::validation_error("Invalid latitude"))?;
    let longitude: f64 = query
        .lon
        .trim()
        .parse()
        .map_err(|_| ApiError::validation_error("Invalid longitude"))?;
    validate_coordinates(latitude, longitude)
        .map_err(|e| ApiError::validation_error(e.to_string()))?;

    let forecast = state
        .weather_service
        .surf_forecast(&query.lat, &query.lon, latitude, longitude)
        .await?;
    Ok(Json(forecast))
}
