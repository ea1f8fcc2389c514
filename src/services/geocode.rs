//! Geocoding service
//!
//! Proxies the Open-Meteo Geocoding API. Responses are not cached;
//! queries shorter than two characters return an empty result set
//! without touching the upstream.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

const GEOCODING_API_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// Minimum query length before the upstream is consulted
pub const MIN_QUERY_LEN: usize = 2;

/// A geocoding match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub id: i64,
    pub name: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<String>,
}

/// Upstream geocoding error
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Geocoding API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Geocoding API returned status {0}")]
    Status(u16),
}

/// Upstream geocoding source
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeResult>, GeocodeError>;
}

/// Open-Meteo Geocoding API client
pub struct OpenMeteoGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl OpenMeteoGeocoder {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: GEOCODING_API_URL.to_string(),
        }
    }
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("name", query),
                ("count", "10"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let payload: Value = response.json().await?;
        Ok(parse_results(&payload))
    }
}

/// Map the upstream payload to our result shape. Entries missing the
/// required fields are skipped; `admin1` becomes `region`.
fn parse_results(payload: &Value) -> Vec<GeocodeResult> {
    let Some(results) = payload.get("results").and_then(Value::as_array) else {
        return Vec::new();
    };

    results
        .iter()
        .filter_map(|entry| {
            Some(GeocodeResult {
                id: entry.get("id")?.as_i64()?,
                name: entry.get("name")?.as_str()?.to_string(),
                region: entry
                    .get("admin1")
                    .and_then(Value::as_str)
                    .map(String::from),
                country: entry
                    .get("country")
                    .and_then(Value::as_str)
                    .map(String::from),
                latitude: entry.get("latitude")?.as_f64()?,
                longitude: entry.get("longitude")?.as_f64()?,
                timezone: entry
                    .get("timezone")
                    .and_then(Value::as_str)
                    .map(String::from),
            })
        })
        .collect()
}

/// Geocoding service
pub struct GeocodeService {
    geocoder: Arc<dyn Geocoder>,
}

impl GeocodeService {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Search place names, applying the minimum query length rule
    pub async fn search(&self, query: &str) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }
        self.geocoder.search(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubGeocoder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn search(&self, _query: &str) -> Result<Vec<GeocodeResult>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![GeocodeResult {
                id: 1,
                name: "Nazaré".to_string(),
                region: Some("Leiria".to_string()),
                country: Some("Portugal".to_string()),
                latitude: 39.6,
                longitude: -9.07,
                timezone: Some("Europe/Lisbon".to_string()),
            }])
        }
    }

    #[tokio::test]
    async fn test_short_query_skips_upstream() {
        let geocoder = Arc::new(StubGeocoder {
            calls: AtomicUsize::new(0),
        });
        let service = GeocodeService::new(geocoder.clone());

        assert!(service.search("").await.unwrap().is_empty());
        assert!(service.search("n").await.unwrap().is_empty());
        assert!(service.search("  n  ").await.unwrap().is_empty());
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_query_at_min_length_hits_upstream() {
        let geocoder = Arc::new(StubGeocoder {
            calls: AtomicUsize::new(0),
        });
        let service = GeocodeService::new(geocoder.clone());

        let results = service.search("na").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Nazaré");
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parse_results_maps_admin1_to_region() {
        let payload = json!({
            "results": [
                {
                    "id": 2267095,
                    "name": "Nazaré",
                    "admin1": "Leiria",
                    "country": "Portugal",
                    "latitude": 39.60146,
                    "longitude": -9.07098,
                    "timezone": "Europe/Lisbon"
                },
                {
                    "id": 99,
                    "name": "Incomplete entry"
                }
            ]
        });

        let results = parse_results(&payload);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].region.as_deref(), Some("Leiria"));
        assert_eq!(results[0].country.as_deref(), Some("Portugal"));
    }

    #[test]
    fn test_parse_results_handles_missing_results_key() {
        // Open-Meteo omits "results" when nothing matches
        let payload = json!({"generationtime_ms": 0.5});
        assert!(parse_results(&payload).is_empty());
    }
}
