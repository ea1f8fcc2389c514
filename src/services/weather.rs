//! Marine weather service
//!
//! Wraps the Open-Meteo Marine API behind the forecast cache. The fetcher
//! is a trait so tests can stub the upstream; production uses
//! [`OpenMeteoFetcher`].

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::cache::ForecastCache;

const MARINE_API_URL: &str = "https://marine-api.open-meteo.com/v1/marine";

/// Hourly variables for the standalone weather endpoint
const SURF_HOURLY: &str = "wave_height,wave_direction,wave_period,wind_wave_height,\
wind_wave_direction,wind_wave_period,sea_surface_temperature";

/// Hourly/daily variables for the spot detail view
const SPOT_HOURLY: &str = "wave_height,wind_wave_height,wind_wave_direction,\
wind_wave_period,wind_speed_10m,wind_direction_10m";
const SPOT_DAILY: &str = "wave_height_max,wind_wave_height_max";

/// Upstream fetch error
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("Marine API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Marine API returned status {0}")]
    Status(u16),
}

/// Which variable set to request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastKind {
    /// Full surf conditions (standalone weather endpoint)
    Surf,
    /// Condensed variables for the spot detail view
    SpotDetail,
}

/// Upstream forecast source
#[async_trait]
pub trait ForecastFetcher: Send + Sync {
    async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        kind: ForecastKind,
    ) -> Result<Value, ForecastError>;
}

/// Open-Meteo Marine API client
pub struct OpenMeteoFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl OpenMeteoFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: MARINE_API_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ForecastFetcher for OpenMeteoFetcher {
    async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        kind: ForecastKind,
    ) -> Result<Value, ForecastError> {
        let mut params = vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("timezone", "auto".to_string()),
        ];
        match kind {
            ForecastKind::Surf => {
                params.push(("hourly", SURF_HOURLY.to_string()));
            }
            ForecastKind::SpotDetail => {
                params.push(("hourly", SPOT_HOURLY.to_string()));
                params.push(("daily", SPOT_DAILY.to_string()));
            }
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ForecastError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

/// Marine weather service
pub struct WeatherService {
    cache: ForecastCache,
    fetcher: Arc<dyn ForecastFetcher>,
}

impl WeatherService {
    pub fn new(cache: ForecastCache, fetcher: Arc<dyn ForecastFetcher>) -> Self {
        Self { cache, fetcher }
    }

    /// Forecast for the standalone weather endpoint.
    ///
    /// `lat_raw`/`lon_raw` are the coordinate strings exactly as the
    /// client sent them; they form the cache key, so differently written
    /// coordinates cache separately even when numerically equal.
    pub async fn surf_forecast(
        &self,
        lat_raw: &str,
        lon_raw: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Arc<Value>, ForecastError> {
        let key = format!("surf:{},{}", lat_raw, lon_raw);
        self.cache
            .get_or_fetch(&key, || {
                self.fetcher.fetch(latitude, longitude, ForecastKind::Surf)
            })
            .await
    }

    /// Forecast joined into a spot detail response
    pub async fn spot_forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Arc<Value>, ForecastError> {
        let key = format!("spot:{},{}", latitude, longitude);
        self.cache
            .get_or_fetch(&key, || {
                self.fetcher
                    .fetch(latitude, longitude, ForecastKind::SpotDetail)
            })
            .await
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::StubFetcher;
    use super::*;
    use tokio::time::Duration;

    fn service(fetcher: Arc<StubFetcher>) -> WeatherService {
        WeatherService::new(
            ForecastCache::new(Duration::from_secs(300), 100),
            fetcher,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_surf_forecast_cached_by_raw_coordinates() {
        let fetcher = Arc::new(StubFetcher::new());
        let service = service(fetcher.clone());

        service
            .surf_forecast("33.5", "-117.8", 33.5, -117.8)
            .await
            .unwrap();
        service
            .surf_forecast("33.5", "-117.8", 33.5, -117.8)
            .await
            .unwrap();
        assert_eq!(fetcher.call_count(), 1);

        // Same point, different spelling: separate entry
        service
            .surf_forecast("33.50", "-117.8", 33.5, -117.8)
            .await
            .unwrap();
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_surf_forecast_refetches_after_window() {
        let fetcher = Arc::new(StubFetcher::new());
        let service = service(fetcher.clone());

        service
            .surf_forecast("33.5", "-117.8", 33.5, -117.8)
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(360)).await;
        service
            .surf_forecast("33.5", "-117.8", 33.5, -117.8)
            .await
            .unwrap();

        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spot_and_surf_keys_do_not_collide() {
        let fetcher = Arc::new(StubFetcher::new());
        let service = service(fetcher.clone());

        service
            .surf_forecast("33.5", "-117.8", 33.5, -117.8)
            .await
            .unwrap();
        let spot = service.spot_forecast(33.5, -117.8).await.unwrap();

        assert_eq!(fetcher.call_count(), 2);
        assert_eq!(spot["kind"], "spot");
    }

    #[tokio::test(start_paused = true)]
    async fn test_upstream_failure_propagates() {
        let fetcher = Arc::new(StubFetcher::failing());
        let service = service(fetcher.clone());

        let err = service
            .surf_forecast("33.5", "-117.8", 33.5, -117.8)
            .await
            .unwrap_err();
        assert!(matches!(err, ForecastError::Status(503)));
    }
}
