//! One search at a time: resolve, optionally disambiguate, fetch, display.

use thiserror::Error;
use tracing::debug;

use crate::{
    error::WeatherError,
    geocode::GeocodeResolver,
    model::{GeoCandidate, GeoResultSet, Units, WeatherRecord},
    weather::WeatherFetcher,
};

/// Where the current search stands.
///
/// `Resolving` and `Fetching` are only observable while the corresponding
/// request is in flight; every public method returns in a settled state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Resolving,
    /// Several places share the name; waiting for [`WeatherSession::select`].
    Disambiguating(GeoResultSet),
    Fetching,
    Displaying(WeatherRecord),
    /// Terminal until a new search or [`WeatherSession::reset`].
    Error(WeatherError),
}

impl SearchState {
    pub fn name(&self) -> &'static str {
        match self {
            SearchState::Idle => "idle",
            SearchState::Resolving => "resolving",
            SearchState::Disambiguating(_) => "disambiguating",
            SearchState::Fetching => "fetching",
            SearchState::Displaying(_) => "displaying",
            SearchState::Error(_) => "error",
        }
    }
}

/// A selection that the current state cannot accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no candidate list to choose from (state: {0})")]
    NotDisambiguating(&'static str),
    #[error("candidate {index} out of range, {available} available")]
    OutOfRange { index: usize, available: usize },
}

/// Drives [`SearchState`] using the injected resolver and fetcher.
#[derive(Debug)]
pub struct WeatherSession {
    resolver: GeocodeResolver,
    fetcher: WeatherFetcher,
    units: Units,
    state: SearchState,
}

impl WeatherSession {
    pub fn new(resolver: GeocodeResolver, fetcher: WeatherFetcher, units: Units) -> Self {
        Self {
            resolver,
            fetcher,
            units,
            state: SearchState::Idle,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Applies to the next fetch; a displayed record keeps its own units.
    pub fn set_units(&mut self, units: Units) {
        self.units = units;
    }

    /// Drop whatever the last search left behind.
    pub fn reset(&mut self) {
        self.state = SearchState::Idle;
    }

    /// Start a new search, replacing any previous candidates, record or error.
    pub async fn search(&mut self, city: &str) -> &SearchState {
        self.reset();
        self.transition(SearchState::Resolving);

        let resolved = self.resolver.resolve(city).await;
        match resolved {
            Err(err) => self.transition(SearchState::Error(err)),
            Ok(set) if set.needs_disambiguation() => {
                self.transition(SearchState::Disambiguating(set))
            }
            Ok(set) => {
                let only = set.first().clone();
                self.fetch(&only).await;
            }
        }

        &self.state
    }

    /// Pick one candidate out of the list shown while disambiguating.
    pub async fn select(&mut self, index: usize) -> Result<&SearchState, SelectionError> {
        let SearchState::Disambiguating(set) = &self.state else {
            return Err(SelectionError::NotDisambiguating(self.state.name()));
        };
        let Some(candidate) = set.get(index).cloned() else {
            return Err(SelectionError::OutOfRange {
                index,
                available: set.len(),
            });
        };

        self.fetch(&candidate).await;
        Ok(&self.state)
    }

    async fn fetch(&mut self, candidate: &GeoCandidate) {
        self.transition(SearchState::Fetching);

        let fetched = self
            .fetcher
            .fetch_weather(candidate.lat, candidate.lon, self.units)
            .await;
        let next = match fetched {
            Ok(record) => SearchState::Displaying(record),
            Err(err) => SearchState::Error(err),
        };
        self.transition(next);
    }

    fn transition(&mut self, next: SearchState) {
        debug!(from = self.state.name(), to = next.name(), "search state");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::NetworkFailure, test_support::ScriptedClient};
    use std::sync::Arc;

    const ONE_PARIS: &str = r#"[{"name":"Paris","country":"FR","lat":48.85,"lon":2.35}]"#;
    const TWO_PARIS: &str = r#"[
        {"name":"Paris","country":"FR","lat":48.85,"lon":2.35},
        {"name":"Paris","country":"US","lat":33.66,"lon":-95.55}
    ]"#;
    const WEATHER: &str = r#"{
        "name":"Paris","sys":{"country":"FR"},
        "main":{"temp":20.0,"temp_min":18.0,"temp_max":22.0,"feels_like":19.5,"humidity":40},
        "wind":{"speed":2.5},
        "weather":[{"main":"Clear","description":"clear sky","icon":"01d"}]
    }"#;

    fn session(client: Arc<ScriptedClient>) -> WeatherSession {
        let resolver =
            GeocodeResolver::new(client.clone(), "http://geo.test/geo/1.0/direct", "K".into());
        let fetcher = WeatherFetcher::new(client, "https://wx.test/data/2.5/weather", "K".into());
        WeatherSession::new(resolver, fetcher, Units::Metric)
    }

    #[tokio::test]
    async fn single_candidate_goes_straight_to_display() {
        let replies = vec![ScriptedClient::ok(ONE_PARIS), ScriptedClient::ok(WEATHER)];
        let client = ScriptedClient::new(replies);
        let mut s = session(client.clone());

        let state = s.search("Paris").await;
        assert!(matches!(state, SearchState::Displaying(r) if r.location_name == "Paris"));
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn several_candidates_wait_for_selection() {
        let replies = vec![ScriptedClient::ok(TWO_PARIS), ScriptedClient::ok(WEATHER)];
        let client = ScriptedClient::new(replies);
        let mut s = session(client.clone());

        let state = s.search("Paris").await;
        let SearchState::Disambiguating(set) = state else {
            panic!("expected disambiguation, got {state:?}");
        };
        assert_eq!(set.labels(), ["Paris | FR", "Paris | US"]);
        assert_eq!(client.calls(), 1);

        let state = s.select(1).await.expect("valid selection");
        assert!(matches!(state, SearchState::Displaying(_)));

        let requested = client.requested.lock().unwrap();
        let query = requested[1].query().unwrap_or_default();
        assert!(query.contains("lat=33.66"));
    }

    #[tokio::test]
    async fn out_of_range_selection_keeps_candidates() {
        let client = ScriptedClient::new(vec![ScriptedClient::ok(TWO_PARIS)]);
        let mut s = session(client);
        s.search("Paris").await;

        let err = s.select(5).await.unwrap_err();
        let expected = SelectionError::OutOfRange {
            index: 5,
            available: 2,
        };
        assert_eq!(err, expected);
        assert!(matches!(s.state(), SearchState::Disambiguating(_)));
    }

    #[tokio::test]
    async fn selection_outside_disambiguation_is_rejected() {
        let client = ScriptedClient::new(Vec::new());
        let mut s = session(client);

        let err = s.select(0).await.unwrap_err();
        assert_eq!(err, SelectionError::NotDisambiguating("idle"));
    }

    #[tokio::test]
    async fn failure_lands_in_error_until_new_search() {
        let client = ScriptedClient::new(vec![
            Err(WeatherError::Network(NetworkFailure::Timeout)),
            ScriptedClient::ok(ONE_PARIS),
            ScriptedClient::ok(WEATHER),
        ]);
        let mut s = session(client);

        let state = s.search("Paris").await;
        let expected = SearchState::Error(WeatherError::Network(NetworkFailure::Timeout));
        assert_eq!(state, &expected);

        let state = s.search("Paris").await;
        assert!(matches!(state, SearchState::Displaying(_)));
    }

    #[tokio::test]
    async fn invalid_input_errors_without_requests() {
        let client = ScriptedClient::new(Vec::new());
        let mut s = session(client.clone());

        let state = s.search("Paris 2").await;
        assert!(matches!(state, SearchState::Error(WeatherError::Validation(_))));
        assert_eq!(client.calls(), 0);

        s.reset();
        assert_eq!(s.state(), &SearchState::Idle);
    }

    #[tokio::test]
    async fn fetch_failure_after_selection_is_error() {
        let client = ScriptedClient::new(vec![
            ScriptedClient::ok(TWO_PARIS),
            Err(WeatherError::HttpStatus { code: 503 }),
        ]);
        let mut s = session(client);
        s.search("Paris").await;

        let state = s.select(0).await.expect("valid selection");
        let expected = SearchState::Error(WeatherError::HttpStatus { code: 503 });
        assert_eq!(state, &expected);
    }

    #[tokio::test]
    async fn units_setting_reaches_the_request() {
        let replies = vec![ScriptedClient::ok(ONE_PARIS), ScriptedClient::ok(WEATHER)];
        let client = ScriptedClient::new(replies);
        let mut s = session(client.clone());
        s.set_units(Units::Imperial);

        let state = s.search("Paris").await;
        assert!(matches!(state, SearchState::Displaying(r) if r.units == Units::Imperial));
        let requested = client.requested.lock().unwrap();
        let query = requested[1].query().unwrap_or_default();
        assert!(query.contains("units=imperial"));
    }
}
