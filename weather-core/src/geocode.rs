use std::sync::Arc;

use reqwest::Url;
use tracing::{debug, info};

use crate::{
    error::WeatherError,
    http::HttpClient,
    model::{GeoCandidate, GeoResultSet},
};

/// Number of candidates requested from the geocoding endpoint.
pub const RESULT_LIMIT: u8 = 5;

/// Turns a city name into the distinct places that carry it.
#[derive(Debug, Clone)]
pub struct GeocodeResolver {
    http: Arc<dyn HttpClient>,
    endpoint: String,
    api_key: String,
}

impl GeocodeResolver {
    pub fn new(http: Arc<dyn HttpClient>, endpoint: impl Into<String>, api_key: String) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_key,
        }
    }

    pub async fn resolve(&self, city: &str) -> Result<GeoResultSet, WeatherError> {
        validate_city_name(city)?;

        let url = self.request_url(city)?;
        let res = self.http.fetch(&url).await?;

        let raw: Vec<GeoCandidate> = serde_json::from_str(&res.body)?;
        debug!(city, returned = raw.len(), "geocoding response");

        let first = raw
            .first()
            .ok_or_else(|| WeatherError::LocationNotFound(city.to_string()))?;

        // The endpoint answers with the closest match even when it is unrelated.
        if !same_name(&first.name, city) {
            debug!(city, closest = %first.name, "closest match does not match input");
            return Err(WeatherError::LocationNotFound(city.to_string()));
        }

        let set = GeoResultSet::from_candidates(raw)
            .ok_or_else(|| WeatherError::LocationNotFound(city.to_string()))?;

        info!(city, candidates = set.len(), "resolved location");
        Ok(set)
    }

    fn request_url(&self, city: &str) -> Result<Url, WeatherError> {
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("q", city),
                ("limit", RESULT_LIMIT.to_string().as_str()),
                ("appid", self.api_key.as_str()),
            ],
        )
        .map_err(|e| WeatherError::Request(format!("invalid geocoding endpoint: {e}")))
    }
}

/// A city name must be non-empty and purely alphabetic.
pub fn validate_city_name(city: &str) -> Result<(), WeatherError> {
    if city.is_empty() || !city.chars().all(char::is_alphabetic) {
        return Err(WeatherError::Validation(city.to_string()));
    }
    Ok(())
}

/// Case-insensitive name equality using full uppercase folding, so that
/// `Straße` and `STRASSE` compare equal.
fn same_name(returned: &str, requested: &str) -> bool {
    returned.to_uppercase() == requested.to_uppercase()
}
