use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Url, redirect::Policy};
use tracing::{debug, warn};

use crate::error::{NetworkFailure, WeatherError};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MAX_REDIRECTS: usize = 10;

/// Body and status of a successful GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Issues a single GET for an already-encoded URL. Implementations never
/// retry: the first failure is returned to the caller unchanged.
#[async_trait]
pub trait HttpClient: Send + Sync + Debug {
    async fn fetch(&self, url: &Url) -> Result<RawResponse, WeatherError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestClient {
    http: Client,
}

impl ReqwestClient {
    pub fn new(timeout: Duration) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| WeatherError::Request(e.to_string()))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn fetch(&self, url: &Url) -> Result<RawResponse, WeatherError> {
        debug!(
            host = url.host_str().unwrap_or_default(),
            path = url.path(),
            "GET"
        );

        let res = self.http.get(url.clone()).send().await.map_err(classify)?;

        // Read the status before anything can consume the response.
        let status = res.status();
        let body = res.text().await.map_err(classify)?;

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                path = url.path(),
                body = %truncate_body(&body),
                "request failed"
            );
            return Err(WeatherError::HttpStatus {
                code: status.as_u16(),
            });
        }

        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }
}

fn classify(err: reqwest::Error) -> WeatherError {
    if err.is_timeout() {
        WeatherError::Network(NetworkFailure::Timeout)
    } else if err.is_redirect() {
        WeatherError::Network(NetworkFailure::TooManyRedirects)
    } else if err.is_connect() {
        WeatherError::Network(NetworkFailure::Connection)
    } else {
        // The URL carries the API key.
        WeatherError::Request(err.without_url().to_string())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
