use thiserror::Error;

use crate::status::StatusCategory;

/// Transport-level problems reaching an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NetworkFailure {
    #[error("connection failed")]
    Connection,
    #[error("request timed out")]
    Timeout,
    #[error("too many redirects")]
    TooManyRedirects,
}

/// Every way a lookup can fail. None of these are retried; each one ends the
/// current operation and is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeatherError {
    /// City name was empty or contained non-alphabetic characters.
    #[error("invalid city name '{0}'")]
    Validation(String),

    /// Geocoding returned nothing, or only an unrelated closest match.
    #[error("location not found: {0}")]
    LocationNotFound(String),

    #[error("network error: {0}")]
    Network(#[from] NetworkFailure),

    /// Server answered with a non-success status.
    #[error("HTTP {code} ({})", category_of(.code))]
    HttpStatus { code: u16 },

    /// Body was not JSON or lacked a required field.
    #[error("cannot read response data: {0}")]
    DataUnreadable(String),

    #[error("request error: {0}")]
    Request(String),
}

impl WeatherError {
    pub fn category(&self) -> Option<StatusCategory> {
        match self {
            WeatherError::HttpStatus { code } => Some(StatusCategory::from_code(*code)),
            _ => None,
        }
    }

    /// Text shown to the user in place of weather data.
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::Validation(_) => "Invalid characters in city name".to_string(),
            WeatherError::LocationNotFound(_) => "Location not found".to_string(),
            WeatherError::Network(NetworkFailure::Connection) => {
                "Network Error\n\nCheck your internet connection".to_string()
            }
            WeatherError::Network(NetworkFailure::Timeout) => {
                "Timeout Error\n\nThe request timed out".to_string()
            }
            WeatherError::Network(NetworkFailure::TooManyRedirects) => {
                "Too many redirects\n\nCheck the URL".to_string()
            }
            WeatherError::HttpStatus { code } => StatusCategory::from_code(*code).user_message(),
            WeatherError::DataUnreadable(_) => "Cannot read data".to_string(),
            WeatherError::Request(message) => format!("Request Error:\n\n{message}"),
        }
    }
}

fn category_of(code: &u16) -> StatusCategory {
    StatusCategory::from_code(*code)
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::DataUnreadable(err.to_string())
    }
}
