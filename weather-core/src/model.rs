use std::{collections::HashSet, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unit system requested from the weather endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(&self) -> char {
        match self {
            Units::Metric => 'C',
            Units::Imperial => 'F',
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial]
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown unit system '{0}', expected 'metric' or 'imperial'")]
pub struct UnknownUnits(String);

impl FromStr for Units {
    type Err = UnknownUnits;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(UnknownUnits(s.to_string())),
        }
    }
}

/// One place returned by the geocoding endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCandidate {
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl GeoCandidate {
    /// `"name | state | country"`, or `"name | country"` without a state.
    pub fn label(&self) -> String {
        match &self.state {
            Some(state) => format!("{} | {} | {}", self.name, state, self.country),
            None => format!("{} | {}", self.name, self.country),
        }
    }
}

impl fmt::Display for GeoCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DedupKey {
    StateCountry(String, String),
    Country(String),
}

impl DedupKey {
    fn of(candidate: &GeoCandidate, by_state: bool) -> Self {
        match (&candidate.state, by_state) {
            (Some(state), true) => DedupKey::StateCountry(state.clone(), candidate.country.clone()),
            _ => DedupKey::Country(candidate.country.clone()),
        }
    }
}

/// Candidates for one search, unique per (state, country) or per country.
///
/// Never empty; order is the order the endpoint returned them in.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoResultSet {
    candidates: Vec<GeoCandidate>,
}

impl GeoResultSet {
    /// Deduplicates `raw` and returns `None` when nothing is left.
    ///
    /// When every candidate carries a state the key is (state, country),
    /// otherwise it is the country alone. The first candidate per key wins.
    pub fn from_candidates(raw: Vec<GeoCandidate>) -> Option<Self> {
        let by_state = raw.iter().all(|c| c.state.is_some());

        let mut seen = HashSet::new();
        let mut candidates = Vec::with_capacity(raw.len());
        for candidate in raw {
            if seen.insert(DedupKey::of(&candidate, by_state)) {
                candidates.push(candidate);
            }
        }

        if candidates.is_empty() {
            None
        } else {
            Some(Self { candidates })
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the set holds no candidates.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn first(&self) -> &GeoCandidate {
        &self.candidates[0]
    }

    pub fn get(&self, index: usize) -> Option<&GeoCandidate> {
        self.candidates.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeoCandidate> {
        self.candidates.iter()
    }

    /// More than one distinct place shares the name.
    pub fn needs_disambiguation(&self) -> bool {
        self.candidates.len() > 1
    }

    pub fn labels(&self) -> Vec<String> {
        self.candidates.iter().map(GeoCandidate::label).collect()
    }
}

/// Current conditions at one place, already converted for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub location_name: String,
    pub country_code: String,
    pub units: Units,
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    pub wind_speed_kmh: f64,
    pub condition_main: String,
    pub condition_description: String,
    pub icon_id: String,
    pub observed_at: Option<DateTime<Utc>>,
}
