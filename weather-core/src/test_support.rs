//! In-memory [`HttpClient`] for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Url;

use crate::{
    error::WeatherError,
    http::{HttpClient, RawResponse},
};

/// Serves scripted replies in order and records every requested URL.
#[derive(Debug, Default)]
pub(crate) struct ScriptedClient {
    replies: Mutex<Vec<Result<RawResponse, WeatherError>>>,
    pub(crate) requested: Mutex<Vec<Url>>,
}

impl ScriptedClient {
    pub(crate) fn new(mut replies: Vec<Result<RawResponse, WeatherError>>) -> Arc<Self> {
        replies.reverse();
        Arc::new(Self {
            replies: Mutex::new(replies),
            requested: Mutex::default(),
        })
    }

    pub(crate) fn ok(body: &str) -> Result<RawResponse, WeatherError> {
        Ok(RawResponse {
            status: 200,
            body: body.to_string(),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn fetch(&self, url: &Url) -> Result<RawResponse, WeatherError> {
        self.requested.lock().unwrap().push(url.clone());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(WeatherError::Request("no scripted reply".into())))
    }
}
