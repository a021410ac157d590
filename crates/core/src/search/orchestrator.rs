//! Search orchestrator implementation.
//!
//! Every input starts a new attempt with a fresh id. The id of the current
//! attempt lives behind the session lock; an attempt may only publish loading
//! or state changes, commit results or surface an error while it holds that
//! lock and its id is still current. Superseding bumps the id and resets the
//! session state under the same lock before signalling cancellation, so a
//! result that arrives after it was superseded is always discarded and a
//! failure never outlives the attempt that produced it.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{broadcast, watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::feed::RepublishSignal;
use crate::metrics::{CACHE_COMMITS, SEARCH_ATTEMPTS};
use crate::movie::{CacheEntry, Movie, RawResult};
use crate::remote::{MovieSearcher, RemoteError, SearchRequest};
use crate::store::{MovieStore, StoreError};

use super::{SearchFailure, SearchState};

/// Buffer size for the search error channel.
const ERROR_BUFFER_SIZE: usize = 16;

/// The attempt that currently owns the session.
struct Attempt {
    id: u64,
    cancel_tx: broadcast::Sender<()>,
    /// Debounced attempts run on their own task; immediate ones run on the caller's.
    handle: Option<JoinHandle<()>>,
}

struct Shared {
    searcher: Arc<dyn MovieSearcher>,
    store: Arc<dyn MovieStore>,
    republish: RepublishSignal,
    config: SearchConfig,
    session: Mutex<u64>,
    attempt: AsyncMutex<Option<Attempt>>,
    loading_tx: watch::Sender<bool>,
    state_tx: watch::Sender<SearchState>,
    errors_tx: broadcast::Sender<SearchFailure>,
}

/// Owns debounce timing, cancellation and cache population for searches.
#[derive(Clone)]
pub struct SearchOrchestrator {
    shared: Arc<Shared>,
}

impl SearchOrchestrator {
    pub fn new(
        searcher: Arc<dyn MovieSearcher>,
        store: Arc<dyn MovieStore>,
        republish: RepublishSignal,
        config: SearchConfig,
    ) -> Self {
        let (loading_tx, _) = watch::channel(false);
        let (state_tx, _) = watch::channel(SearchState::Idle);
        let (errors_tx, _) = broadcast::channel(ERROR_BUFFER_SIZE);

        Self {
            shared: Arc::new(Shared {
                searcher,
                store,
                republish,
                config,
                session: Mutex::new(0),
                attempt: AsyncMutex::new(None),
                loading_tx,
                state_tx,
                errors_tx,
            }),
        }
    }

    /// Handle a change of the search input.
    ///
    /// Cancels the previous attempt and waits for it to tear down. Blank input
    /// clears the cache (or republishes the feed if it is already empty);
    /// anything else is searched once the debounce interval passes without
    /// another input.
    pub async fn on_input(&self, input: &str) {
        let mut attempt = self.shared.attempt.lock().await;
        let id = self.shared.supersede(&mut attempt).await;

        if input.trim().is_empty() {
            self.shared.settle_blank(id);
            return;
        }

        self.shared.set_state(
            id,
            SearchState::Pending {
                query: input.to_string(),
            },
        );

        let (cancel_tx, cancel_rx) = broadcast::channel(1);
        let shared = Arc::clone(&self.shared);
        let query = input.to_string();
        let handle = tokio::spawn(async move {
            let delay = Duration::from_millis(shared.config.debounce_ms);
            let _ = shared.run(id, query, cancel_rx, Some(delay)).await;
        });

        *attempt = Some(Attempt {
            id,
            cancel_tx,
            handle: Some(handle),
        });
    }

    /// Search `query` immediately and replace the cache with the results.
    ///
    /// Supersedes any previous attempt. Returns the committed movies, or
    /// `RemoteError::Cancelled` if another input superseded this one first.
    pub async fn execute(&self, query: &str) -> Result<Vec<Movie>, RemoteError> {
        let (id, cancel_rx) = {
            let mut attempt = self.shared.attempt.lock().await;
            let id = self.shared.supersede(&mut attempt).await;

            if query.trim().is_empty() {
                self.shared.settle_blank(id);
                return Ok(Vec::new());
            }

            let (cancel_tx, cancel_rx) = broadcast::channel(1);
            *attempt = Some(Attempt {
                id,
                cancel_tx,
                handle: None,
            });
            (id, cancel_rx)
        };

        self.shared
            .run(id, query.to_string(), cancel_rx, None)
            .await
    }

    /// Cancel whatever attempt is pending or in flight.
    pub async fn cancel(&self) {
        let mut attempt = self.shared.attempt.lock().await;
        self.shared.supersede(&mut attempt).await;
    }

    /// Clear the cache, or republish the feed if the cache is already empty.
    pub fn clear_cache(&self) -> Result<(), StoreError> {
        self.shared.clear_or_republish()
    }

    /// Loading indicator, true while a remote call is in flight.
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.shared.loading_tx.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        *self.shared.loading_tx.borrow()
    }

    /// Session state of the current attempt.
    ///
    /// `Failed` is only ever held by the attempt that failed; the next input
    /// resets it before doing anything else.
    pub fn state(&self) -> watch::Receiver<SearchState> {
        self.shared.state_tx.subscribe()
    }

    /// Subscribe to surfaced search failures. Cancellation is never sent.
    pub fn subscribe_errors(&self) -> broadcast::Receiver<SearchFailure> {
        self.shared.errors_tx.subscribe()
    }
}

impl Shared {
    fn lock_session(&self) -> MutexGuard<'_, u64> {
        // The guarded counter is always valid, even after a panic elsewhere.
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Invalidate the current attempt and wait for its task to finish.
    async fn supersede(&self, attempt: &mut Option<Attempt>) -> u64 {
        let id = {
            let mut session = self.lock_session();
            *session += 1;
            self.state_tx.send_if_modified(|state| {
                let changed = *state != SearchState::Idle;
                *state = SearchState::Idle;
                changed
            });
            *session
        };

        if let Some(previous) = attempt.take() {
            debug!(attempt = previous.id, "Cancelling superseded search");
            let _ = previous.cancel_tx.send(());
            self.set_loading(false);

            if let Some(handle) = previous.handle {
                if let Err(e) = handle.await {
                    warn!(attempt = previous.id, "Search task failed: {}", e);
                }
            }
        }

        id
    }

    async fn run(
        &self,
        id: u64,
        query: String,
        mut cancel_rx: broadcast::Receiver<()>,
        debounce: Option<Duration>,
    ) -> Result<Vec<Movie>, RemoteError> {
        if let Some(delay) = debounce {
            tokio::select! {
                _ = cancel_rx.recv() => {
                    debug!(attempt = id, query = %query, "Search cancelled during debounce");
                    SEARCH_ATTEMPTS.with_label_values(&["cancelled"]).inc();
                    return Err(RemoteError::Cancelled);
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        if !self.begin_request(id, &query) {
            SEARCH_ATTEMPTS.with_label_values(&["cancelled"]).inc();
            return Err(RemoteError::Cancelled);
        }

        let request = SearchRequest {
            term: query.clone(),
            country: self.config.country.clone(),
            media: self.config.media.clone(),
        };

        debug!(
            attempt = id,
            query = %query,
            backend = self.searcher.name(),
            "Searching"
        );

        let result = tokio::select! {
            _ = cancel_rx.recv() => Err(RemoteError::Cancelled),
            result = self.searcher.search(&request) => result,
        };

        self.settle(id, &query, result)
    }

    /// Mark the attempt in flight. Returns false if it was superseded.
    fn begin_request(&self, id: u64, query: &str) -> bool {
        let session = self.lock_session();
        if *session != id {
            return false;
        }

        self.set_loading(true);
        self.state_tx.send_replace(SearchState::InFlight {
            query: query.to_string(),
        });
        true
    }

    fn settle(
        &self,
        id: u64,
        query: &str,
        result: Result<Vec<RawResult>, RemoteError>,
    ) -> Result<Vec<Movie>, RemoteError> {
        let session = self.lock_session();
        if *session != id {
            debug!(attempt = id, query = %query, "Discarding superseded search result");
            SEARCH_ATTEMPTS.with_label_values(&["cancelled"]).inc();
            return Err(RemoteError::Cancelled);
        }

        let outcome = result.and_then(|raw| self.commit(query, raw));

        match &outcome {
            Ok(movies) => {
                SEARCH_ATTEMPTS.with_label_values(&["success"]).inc();
                CACHE_COMMITS.with_label_values(&["search"]).inc();
                info!(query = %query, count = movies.len(), "Search results cached");
                self.state_tx.send_replace(SearchState::Succeeded {
                    query: query.to_string(),
                    count: movies.len(),
                });
            }
            Err(RemoteError::Cancelled) => {
                SEARCH_ATTEMPTS.with_label_values(&["cancelled"]).inc();
                self.state_tx.send_replace(SearchState::Idle);
            }
            Err(e) => {
                SEARCH_ATTEMPTS.with_label_values(&[e.kind()]).inc();
                warn!(query = %query, "Search failed: {}", e);
                self.publish_failure(query, e);
            }
        }
        self.set_loading(false);
        drop(session);

        outcome
    }

    /// Replace the cache with `raw`, tagged with `query`.
    fn commit(&self, query: &str, raw: Vec<RawResult>) -> Result<Vec<Movie>, RemoteError> {
        let movies: Vec<Movie> = raw.into_iter().map(Movie::from).collect();
        let entries: Vec<CacheEntry> = movies
            .iter()
            .map(|movie| CacheEntry::from_movie(movie, query))
            .collect();

        self.store
            .replace_all_cache_entries(&entries)
            .map_err(|e| RemoteError::Failure(format!("Failed to store results: {}", e)))?;

        Ok(movies)
    }

    /// Caller must hold the session lock with `query`'s attempt current.
    fn publish_failure(&self, query: &str, error: &RemoteError) {
        if let Some(failure) = SearchFailure::from_error(error) {
            self.state_tx.send_replace(SearchState::Failed {
                query: query.to_string(),
                failure: failure.clone(),
            });
            // No receivers just means nobody is listening.
            let _ = self.errors_tx.send(failure);
        }
    }

    fn settle_blank(&self, id: u64) {
        let result = self.clear_or_republish();

        let session = self.lock_session();
        if *session != id {
            return;
        }
        match result {
            Ok(()) => {
                self.state_tx.send_replace(SearchState::Idle);
            }
            Err(e) => {
                warn!("Failed to clear search cache: {}", e);
                self.publish_failure("", &RemoteError::Failure(e.to_string()));
            }
        }
    }

    fn clear_or_republish(&self) -> Result<(), StoreError> {
        if self.store.is_cache_empty()? {
            debug!("Cache already empty, republishing feed");
            self.republish.tick();
        } else {
            self.store.clear_all_cache_entries()?;
        }
        Ok(())
    }

    fn set_loading(&self, loading: bool) {
        self.loading_tx.send_if_modified(|current| {
            let changed = *current != loading;
            *current = loading;
            changed
        });
    }

    /// Set the session state if `id` is still current.
    fn set_state(&self, id: u64, state: SearchState) {
        let session = self.lock_session();
        if *session == id {
            self.state_tx.send_replace(state);
        }
    }
}
