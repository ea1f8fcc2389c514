//! Surf spot service

use serde_json::Value;
use std::sync::Arc;

use crate::db::repositories::{SpotFilter, SpotRepository};
use crate::models::{NewSpot, SpotSource, SurfSpot};
use crate::services::weather::WeatherService;

/// Spot service errors
#[derive(Debug, thiserror::Error)]
pub enum SpotServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("Spot not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Surf spot service
pub struct SpotService {
    spots: Arc<dyn SpotRepository>,
    weather: Arc<WeatherService>,
}

impl SpotService {
    pub fn new(spots: Arc<dyn SpotRepository>, weather: Arc<WeatherService>) -> Self {
        Self { spots, weather }
    }

    pub async fn list(&self, filter: &SpotFilter) -> Result<Vec<SurfSpot>, SpotServiceError> {
        Ok(self.spots.list(filter).await?)
    }

    /// Create a user-submitted spot. `created_by` is recorded when the
    /// caller is logged in.
    pub async fn create(
        &self,
        spot: NewSpot,
        created_by: Option<i64>,
    ) -> Result<SurfSpot, SpotServiceError> {
        if spot.name.trim().is_empty() {
            return Err(SpotServiceError::Validation(
                "Spot name is required".to_string(),
            ));
        }
        validate_coordinates(spot.latitude, spot.longitude)?;

        Ok(self
            .spots
            .insert(spot, SpotSource::User, created_by)
            .await?)
    }

    /// Spot detail with its marine forecast joined in.
    ///
    /// A forecast failure degrades to `None` rather than failing the
    /// request; the spot data is still useful without conditions.
    pub async fn get_with_weather(
        &self,
        id: i64,
    ) -> Result<(SurfSpot, Option<Arc<Value>>), SpotServiceError> {
        let spot = self
            .spots
            .find(id)
            .await?
            .ok_or(SpotServiceError::NotFound)?;

        let weather = match self
            .weather
            .spot_forecast(spot.latitude, spot.longitude)
            .await
        {
            Ok(forecast) => Some(forecast),
            Err(e) => {
                tracing::warn!("Marine forecast unavailable for spot {}: {}", id, e);
                None
            }
        };

        Ok((spot, weather))
    }
}

/// Reject coordinates outside the WGS84 ranges
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), SpotServiceError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(SpotServiceError::Validation(
            "Latitude must be between -90 and 90".to_string(),
        ));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(SpotServiceError::Validation(
            "Longitude must be between -180 and 180".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ForecastCache;
    use crate::db::repositories::MemorySpotRepository;
    use crate::services::weather::test_support::StubFetcher;
    use tokio::time::Duration;

    fn service(fetcher: Arc<StubFetcher>) -> SpotService {
        let weather = Arc::new(WeatherService::new(
            ForecastCache::new(Duration::from_secs(300), 100),
            fetcher,
        ));
        SpotService::new(Arc::new(MemorySpotRepository::new()), weather)
    }

    fn new_spot(name: &str, latitude: f64, longitude: f64) -> NewSpot {
        NewSpot {
            name: name.to_string(),
            description: None,
            latitude,
            longitude,
            country: Some("Portugal".to_string()),
            region: Some("Leiria".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_records_source_and_creator() {
        let service = service(Arc::new(StubFetcher::new()));
        let spot = service
            .create(new_spot("Nazaré", 39.6, -9.07), Some(42))
            .await
            .unwrap();

        assert_eq!(spot.source, SpotSource::User);
        assert_eq!(spot.created_by, Some(42));
    }

    #[tokio::test]
    async fn test_create_anonymous_has_no_creator() {
        let service = service(Arc::new(StubFetcher::new()));
        let spot = service
            .create(new_spot("Nazaré", 39.6, -9.07), None)
            .await
            .unwrap();
        assert_eq!(spot.created_by, None);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let service = service(Arc::new(StubFetcher::new()));
        let err = service
            .create(new_spot("   ", 39.6, -9.07), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SpotServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_coordinates() {
        let service = service(Arc::new(StubFetcher::new()));

        for (lat, lon) in [(91.0, 0.0), (-90.1, 0.0), (0.0, 180.5), (0.0, -181.0)] {
            let err = service
                .create(new_spot("Somewhere", lat, lon), None)
                .await
                .unwrap_err();
            assert!(matches!(err, SpotServiceError::Validation(_)), "{lat},{lon}");
        }

        // Boundary values are valid
        service
            .create(new_spot("Pole break", 90.0, -180.0), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_with_weather_joins_forecast() {
        let fetcher = Arc::new(StubFetcher::new());
        let service = service(fetcher.clone());
        let spot = service
            .create(new_spot("Nazaré", 39.6, -9.07), None)
            .await
            .unwrap();

        let (found, weather) = service.get_with_weather(spot.id).await.unwrap();
        assert_eq!(found.id, spot.id);
        assert!(weather.is_some());
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_get_with_weather_degrades_on_upstream_failure() {
        let service = service(Arc::new(StubFetcher::failing()));
        let spot = service
            .create(new_spot("Nazaré", 39.6, -9.07), None)
            .await
            .unwrap();

        let (found, weather) = service.get_with_weather(spot.id).await.unwrap();
        assert_eq!(found.id, spot.id);
        assert!(weather.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_spot() {
        let service = service(Arc::new(StubFetcher::new()));
        let err = service.get_with_weather(999).await.unwrap_err();
        assert!(matches!(err, SpotServiceError::NotFound));
    }

    #[tokio::test]
    async fn test_list_passes_filters_through() {
        let service = service(Arc::new(StubFetcher::new()));
        service
            .create(new_spot("Nazaré", 39.6, -9.07), None)
            .await
            .unwrap();
        service
            .create(new_spot("Supertubos", 39.35, -9.37), None)
            .await
            .unwrap();

        let all = service.list(&SpotFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let filtered = service
            .list(&SpotFilter {
                q: Some("super".to_string()),
                region: None,
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Supertubos");
    }
}
