//! iTunes Search API backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::ItunesConfig;
use crate::metrics::REMOTE_REQUEST_DURATION;
use crate::movie::RawResult;

use super::{MovieSearcher, RemoteError, SearchRequest, SearchResponse};

/// iTunes Search API client.
pub struct ItunesClient {
    client: Client,
    base_url: String,
}

impl ItunesClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &ItunesConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| RemoteError::Failure(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn map_request_error(e: reqwest::Error) -> RemoteError {
        if e.is_connect() || e.is_timeout() {
            RemoteError::Connectivity(e.to_string())
        } else {
            RemoteError::Failure(e.to_string())
        }
    }
}

#[async_trait]
impl MovieSearcher for ItunesClient {
    fn name(&self) -> &str {
        "itunes"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawResult>, RemoteError> {
        let url = format!("{}/search", self.base_url);
        let start = Instant::now();

        debug!(term = %request.term, country = %request.country, media = %request.media, "iTunes search");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("term", request.term.as_str()),
                ("country", request.country.as_str()),
                ("media", request.media.as_str()),
            ])
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Failure(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Failure(format!("Failed to parse response: {}", e)))?;

        REMOTE_REQUEST_DURATION
            .with_label_values(&[self.name()])
            .observe(start.elapsed().as_secs_f64());

        debug!(
            term = %request.term,
            results = body.results.len(),
            "iTunes search complete"
        );

        Ok(body.results)
    }
}
