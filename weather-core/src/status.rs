use std::fmt;

/// Classification of a non-success HTTP status returned by either endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCategory {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    InternalServerError,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    Other(u16),
}

impl StatusCategory {
    pub fn from_code(code: u16) -> Self {
        match code {
            400 => StatusCategory::BadRequest,
            401 => StatusCategory::Unauthorized,
            403 => StatusCategory::Forbidden,
            404 => StatusCategory::NotFound,
            500 => StatusCategory::InternalServerError,
            502 => StatusCategory::BadGateway,
            503 => StatusCategory::ServiceUnavailable,
            504 => StatusCategory::GatewayTimeout,
            other => StatusCategory::Other(other),
        }
    }

    /// Short lowercase name, suitable for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCategory::BadRequest => "bad request",
            StatusCategory::Unauthorized => "unauthorized",
            StatusCategory::Forbidden => "forbidden",
            StatusCategory::NotFound => "not found",
            StatusCategory::InternalServerError => "internal server error",
            StatusCategory::BadGateway => "bad gateway",
            StatusCategory::ServiceUnavailable => "service unavailable",
            StatusCategory::GatewayTimeout => "gateway timeout",
            StatusCategory::Other(_) => "http error",
        }
    }

    /// Text shown to the user in place of weather data.
    pub fn user_message(&self) -> String {
        match self {
            StatusCategory::BadRequest => "Bad request\n\nPlease check your input".to_string(),
            StatusCategory::Unauthorized => "Unauthorized\n\nInvalid API key".to_string(),
            StatusCategory::Forbidden => "Forbidden\n\nAccess is denied".to_string(),
            StatusCategory::NotFound => "City not found".to_string(),
            StatusCategory::InternalServerError => {
                "Internal server error\n\nPlease try again later".to_string()
            }
            StatusCategory::BadGateway => {
                "Bad gateway\n\nInvalid response from the server".to_string()
            }
            StatusCategory::ServiceUnavailable => {
                "Service unavailable\n\nServer is down".to_string()
            }
            StatusCategory::GatewayTimeout => {
                "Gateway timeout\n\nNo response from the server".to_string()
            }
            StatusCategory::Other(code) => format!("HTTP Error {code}"),
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCategory::Other(code) => write!(f, "http error {code}"),
            named => f.write_str(named.as_str()),
        }
    }
}
