use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    error::WeatherError,
    http::HttpClient,
    model::{Units, WeatherRecord},
};

/// m/s to km/h.
pub const MPS_TO_KMH: f64 = 18.0 / 5.0;
/// mph to km/h.
pub const MPH_TO_KMH: f64 = 1.609_344;

/// Fetches current conditions for a coordinate pair. Every call hits the
/// network; nothing is cached.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    http: Arc<dyn HttpClient>,
    endpoint: String,
    api_key: String,
}

impl WeatherFetcher {
    pub fn new(http: Arc<dyn HttpClient>, endpoint: impl Into<String>, api_key: String) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_key,
        }
    }

    pub async fn fetch_weather(
        &self,
        lat: f64,
        lon: f64,
        units: Units,
    ) -> Result<WeatherRecord, WeatherError> {
        let url = self.request_url(lat, lon, units)?;
        let res = self.http.fetch(&url).await?;

        let parsed: OwCurrentResponse = serde_json::from_str(&res.body)?;
        let record = parsed.into_record(units)?;

        info!(
            location = %record.location_name,
            country = %record.country_code,
            temp = record.temp,
            "fetched current weather"
        );
        Ok(record)
    }

    fn request_url(&self, lat: f64, lon: f64, units: Units) -> Result<Url, WeatherError> {
        let url = Url::parse_with_params(
            &self.endpoint,
            &[
                ("lat", lat.to_string().as_str()),
                ("lon", lon.to_string().as_str()),
                ("appid", self.api_key.as_str()),
                ("units", units.as_str()),
                ("lang", "eng"),
            ],
        )
        .map_err(|e| WeatherError::Request(format!("invalid weather endpoint: {e}")))?;

        debug!(lat, lon, %units, "weather request");
        Ok(url)
    }
}

/// Wind speed in km/h. The endpoint reports m/s for metric and mph for
/// imperial.
pub fn wind_speed_kmh(speed: f64, units: Units) -> f64 {
    match units {
        Units::Metric => speed * MPS_TO_KMH,
        Units::Imperial => speed * MPH_TO_KMH,
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    #[serde(default)]
    dt: Option<i64>,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl OwCurrentResponse {
    fn into_record(self, units: Units) -> Result<WeatherRecord, WeatherError> {
        let Some(condition) = self.weather.into_iter().next() else {
            let msg = "response has no condition entry";
            return Err(WeatherError::DataUnreadable(msg.into()));
        };

        Ok(WeatherRecord {
            location_name: self.name,
            country_code: self.sys.country,
            units,
            temp: self.main.temp,
            temp_min: self.main.temp_min,
            temp_max: self.main.temp_max,
            feels_like: self.main.feels_like,
            humidity_pct: self.main.humidity,
            wind_speed_kmh: wind_speed_kmh(self.wind.speed, units),
            condition_main: condition.main,
            condition_description: condition.description,
            icon_id: condition.icon,
            observed_at: self.dt.and_then(unix_to_utc),
        })
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::test_support::ScriptedClient;

    const LONDON: &str = r#"{
        "coord": {"lon": -0.1257, "lat": 51.5085},
        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
        "main": {
            "temp": 12.5, "feels_like": 11.8, "temp_min": 10.9, "temp_max": 13.6,
            "pressure": 1012, "humidity": 81
        },
        "wind": {"speed": 5, "deg": 240},
        "dt": 1700000000,
        "sys": {"country": "GB"},
        "name": "London"
    }"#;

    fn fetcher(client: Arc<ScriptedClient>) -> WeatherFetcher {
        WeatherFetcher::new(client, "https://wx.test/data/2.5/weather", "KEY".into())
    }

    async fn fetch(body: &str) -> Result<WeatherRecord, WeatherError> {
        let client = ScriptedClient::new(vec![ScriptedClient::ok(body)]);
        let fetcher = fetcher(client);
        fetcher.fetch_weather(0.0, 0.0, Units::Metric).await
    }

    #[tokio::test]
    async fn parses_and_converts_metric_response() {
        let record = fetch(LONDON).await.unwrap();

        assert_eq!(record.location_name, "London");
        assert_eq!(record.country_code, "GB");
        assert_eq!(record.temp, 12.5);
        assert_eq!(record.temp_min, 10.9);
        assert_eq!(record.temp_max, 13.6);
        assert_eq!(record.feels_like, 11.8);
        assert_eq!(record.humidity_pct, 81);
        assert_eq!(format!("{:.2}", record.wind_speed_kmh), "18.00");
        assert_eq!(record.condition_main, "Clouds");
        assert_eq!(record.condition_description, "broken clouds");
        assert_eq!(record.icon_id, "04d");
        let observed = record.observed_at.map(|t| t.timestamp());
        assert_eq!(observed, Some(1_700_000_000));
    }

    #[tokio::test]
    async fn request_carries_coordinates_units_and_lang() {
        let client = ScriptedClient::new(vec![ScriptedClient::ok(LONDON)]);
        let fetcher = fetcher(client.clone());
        fetcher
            .fetch_weather(51.5, -0.12, Units::Imperial)
            .await
            .unwrap();

        let requested = client.requested.lock().unwrap();
        let query: HashMap<String, String> = requested[0].query_pairs().into_owned().collect();

        assert_eq!(query["lat"], "51.5");
        assert_eq!(query["lon"], "-0.12");
        assert_eq!(query["appid"], "KEY");
        assert_eq!(query["units"], "imperial");
        assert_eq!(query["lang"], "eng");
    }

    #[tokio::test]
    async fn every_call_hits_the_network() {
        let replies = vec![ScriptedClient::ok(LONDON), ScriptedClient::ok(LONDON)];
        let client = ScriptedClient::new(replies);
        let fetcher = fetcher(client.clone());
        let units = Units::Metric;

        fetcher.fetch_weather(1.0, 2.0, units).await.unwrap();
        fetcher.fetch_weather(1.0, 2.0, units).await.unwrap();

        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn missing_field_is_unreadable() {
        let body = r#"{"name":"London","sys":{"country":"GB"},"weather":[],"wind":{"speed":1}}"#;
        let err = fetch(body).await.unwrap_err();

        assert!(matches!(err, WeatherError::DataUnreadable(_)));
    }

    #[tokio::test]
    async fn empty_condition_list_is_unreadable() {
        let body = LONDON.replace(
            r#"[{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}]"#,
            "[]",
        );
        let err = fetch(&body).await.unwrap_err();

        assert!(matches!(err, WeatherError::DataUnreadable(_)));
    }

    #[tokio::test]
    async fn non_json_is_unreadable() {
        let err = fetch("<html>oops</html>").await.unwrap_err();

        assert_eq!(err.user_message(), "Cannot read data");
    }

    #[test]
    fn wind_conversion_per_unit_system() {
        assert_eq!(wind_speed_kmh(5.0, Units::Metric), 18.0);
        let imperial = wind_speed_kmh(10.0, Units::Imperial);
        assert_eq!(format!("{imperial:.2}"), "16.09");
    }
}
