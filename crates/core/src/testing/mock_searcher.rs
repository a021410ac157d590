//! Mock searcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::movie::RawResult;
use crate::remote::{MovieSearcher, RemoteError, SearchRequest};

/// A recorded search for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    /// The request that was searched.
    pub request: SearchRequest,
    /// When the search was made, on the tokio clock so paused tests see it advance.
    pub timestamp: Instant,
}

/// A query handler that produces results dynamically based on the term.
type QueryHandler = Box<dyn Fn(&str) -> Option<Vec<RawResult>> + Send + Sync>;

/// Mock implementation of the MovieSearcher trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable search results
/// - Track search requests for assertions
/// - Simulate failures and slow responses
///
/// Searches are recorded when they start, so a call that is cancelled while
/// delayed still shows up in [`recorded_searches`](Self::recorded_searches).
pub struct MockSearcher {
    /// Configured results to return.
    results: Arc<RwLock<Vec<RawResult>>>,
    /// Recorded search requests.
    searches: Arc<RwLock<Vec<RecordedSearch>>>,
    /// If set, the next completed search will fail with this error.
    next_error: Arc<RwLock<Option<RemoteError>>>,
    /// Delay applied to every search.
    delay: Arc<RwLock<Duration>>,
    /// Per-term delays, overriding `delay`.
    query_delays: Arc<RwLock<HashMap<String, Duration>>>,
    /// Per-term errors, returned by every completed search for that term.
    query_errors: Arc<RwLock<HashMap<String, RemoteError>>>,
    /// Query handler for dynamic result generation based on the term.
    query_handler: Arc<RwLock<Option<QueryHandler>>>,
}

impl std::fmt::Debug for MockSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSearcher")
            .field("results", &"<results>")
            .field("searches", &"<searches>")
            .field("next_error", &"<next_error>")
            .field("delay", &"<delay>")
            .field("query_delays", &"<query_delays>")
            .field("query_errors", &"<query_errors>")
            .field("query_handler", &"<handler>")
            .finish()
    }
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearcher {
    /// Create a new mock searcher with empty results.
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(Vec::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            query_delays: Arc::new(RwLock::new(HashMap::new())),
            query_errors: Arc::new(RwLock::new(HashMap::new())),
            query_handler: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the results to return for subsequent searches.
    pub async fn set_results(&self, results: Vec<RawResult>) {
        *self.results.write().await = results;
    }

    /// Get recorded search requests.
    pub async fn recorded_searches(&self) -> Vec<SearchRequest> {
        self.searches
            .read()
            .await
            .iter()
            .map(|s| s.request.clone())
            .collect()
    }

    /// Get recorded searches with their timestamps.
    pub async fn recorded_with_timestamps(&self) -> Vec<RecordedSearch> {
        self.searches.read().await.clone()
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }

    /// Configure the next search to fail with the given error.
    pub async fn set_next_error(&self, error: RemoteError) {
        *self.next_error.write().await = Some(error);
    }

    /// Delay every search response by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Delay responses for `term` by `delay`.
    pub async fn set_query_delay(&self, term: &str, delay: Duration) {
        self.query_delays
            .write()
            .await
            .insert(term.to_string(), delay);
    }

    /// Fail every search for `term` with `error`, after any delay.
    pub async fn set_query_error(&self, term: &str, error: RemoteError) {
        self.query_errors
            .write()
            .await
            .insert(term.to_string(), error);
    }

    /// Set a query handler that dynamically generates results based on the term.
    ///
    /// The handler returns `Some(results)` to override the default results, or
    /// `None` to fall back to them.
    pub async fn set_query_handler<F>(&self, handler: F)
    where
        F: Fn(&str) -> Option<Vec<RawResult>> + Send + Sync + 'static,
    {
        *self.query_handler.write().await = Some(Box::new(handler));
    }

    async fn delay_for(&self, term: &str) -> Duration {
        match self.query_delays.read().await.get(term) {
            Some(delay) => *delay,
            None => *self.delay.read().await,
        }
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<RemoteError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl MovieSearcher for MockSearcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawResult>, RemoteError> {
        self.searches.write().await.push(RecordedSearch {
            request: request.clone(),
            timestamp: Instant::now(),
        });

        let delay = self.delay_for(&request.term).await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        if let Some(err) = self.query_errors.read().await.get(&request.term) {
            return Err(err.clone());
        }

        let handler = self.query_handler.read().await;
        if let Some(ref h) = *handler {
            if let Some(results) = h(&request.term) {
                return Ok(results);
            }
        }
        drop(handler);

        // Default: filter by term in track name (case-insensitive)
        let term = request.term.to_lowercase();
        let results = self
            .results
            .read()
            .await
            .iter()
            .filter(|r| term.is_empty() || r.track_name.to_lowercase().contains(&term))
            .cloned()
            .collect();

        Ok(results)
    }
}
