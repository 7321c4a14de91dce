//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Resolving a city name into distinct candidate locations (geocoding)
//! - Fetching current weather for a coordinate pair
//! - The failure taxonomy and its user-facing messages
//! - A search session tying both steps into one state machine
//! - Configuration & credentials handling
//!
//! It is used by `weather-cli`, but can also back other front-ends.

pub mod config;
pub mod display;
pub mod error;
pub mod geocode;
pub mod http;
pub mod model;
pub mod session;
pub mod status;
pub mod weather;

#[cfg(test)]
mod test_support;

pub use config::{Config, Endpoints};
pub use error::{NetworkFailure, WeatherError};
pub use geocode::GeocodeResolver;
pub use http::{HttpClient, RawResponse, ReqwestClient};
pub use model::{GeoCandidate, GeoResultSet, Units, WeatherRecord};
pub use session::{SearchState, SelectionError, WeatherSession};
pub use status::StatusCategory;
pub use weather::WeatherFetcher;
