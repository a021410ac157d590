//! Facade composing favorites, search, display tracking and the feed.

use std::sync::Arc;

use futures::Stream;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::SearchConfig;
use crate::display::DisplayTracker;
use crate::feed::{feed_stream, FeedCombinator, FeedSnapshot, RepublishSignal};
use crate::movie::{Favorite, Movie};
use crate::remote::{MovieSearcher, RemoteError};
use crate::search::{SearchFailure, SearchOrchestrator, SearchState};
use crate::store::{MovieStore, StoreError};

/// Entry point for presentation code.
///
/// Owns the republish signal and the feed task; everything else is
/// delegated. Must be created inside a tokio runtime.
pub struct Repository {
    store: Arc<dyn MovieStore>,
    tracker: DisplayTracker,
    search: SearchOrchestrator,
    feed_rx: watch::Receiver<FeedSnapshot>,
    feed_task: JoinHandle<()>,
}

impl Repository {
    pub fn new(
        store: Arc<dyn MovieStore>,
        searcher: Arc<dyn MovieSearcher>,
        config: SearchConfig,
    ) -> Self {
        let republish = RepublishSignal::new();
        let tracker = DisplayTracker::new(Arc::clone(&store));
        let search = SearchOrchestrator::new(
            searcher,
            Arc::clone(&store),
            republish.clone(),
            config,
        );

        let combinator = FeedCombinator::new(store.as_ref(), &republish, search.state());
        let (feed_rx, feed_task) = combinator.spawn();

        Self {
            store,
            tracker,
            search,
            feed_rx,
            feed_task,
        }
    }

    pub fn add_favorite(&self, movie: &Movie) -> Result<(), StoreError> {
        debug!(id = movie.id, "Adding favorite");
        self.store.upsert_favorite(&Favorite::from(movie))
    }

    pub fn remove_favorite(&self, id: i64) -> Result<(), StoreError> {
        debug!(id, "Removing favorite");
        self.store.delete_favorite(id)
    }

    /// Flip the favorite status of `movie` as currently shown.
    ///
    /// Returns the new status.
    pub fn toggle_favorite(&self, movie: &Movie) -> Result<bool, StoreError> {
        if movie.is_favorite {
            self.remove_favorite(movie.id)?;
            Ok(false)
        } else {
            self.add_favorite(movie)?;
            Ok(true)
        }
    }

    pub fn favorites(&self) -> Result<Vec<Movie>, StoreError> {
        Ok(self
            .store
            .favorites()?
            .iter()
            .map(|favorite| favorite.to_movie().with_favorite(true))
            .collect())
    }

    /// Search immediately and replace the cache with the results.
    pub async fn search(&self, query: &str) -> Result<Vec<Movie>, RemoteError> {
        self.search.execute(query).await
    }

    /// Feed a change of the search box text into the debounced search.
    pub async fn on_search_changed(&self, input: &str) {
        self.search.on_input(input).await
    }

    pub fn set_displayed(&self, id: i64) -> Result<bool, StoreError> {
        self.tracker.set_displayed(id)
    }

    pub fn clear_displayed(&self) -> Result<(), StoreError> {
        self.tracker.clear_displayed()
    }

    pub fn get_displayed(&self) -> Result<Option<Movie>, StoreError> {
        self.tracker.get_displayed()
    }

    pub fn clear_cache(&self) -> Result<(), StoreError> {
        self.search.clear_cache()
    }

    /// Receiver for the unified feed.
    pub fn feed(&self) -> watch::Receiver<FeedSnapshot> {
        self.feed_rx.clone()
    }

    /// The latest feed snapshot.
    pub fn current_feed(&self) -> FeedSnapshot {
        self.feed_rx.borrow().clone()
    }

    /// The unified feed as a stream, starting with the current snapshot.
    pub fn feed_stream(&self) -> impl Stream<Item = FeedSnapshot> {
        feed_stream(self.feed_rx.clone())
    }

    pub fn loading(&self) -> watch::Receiver<bool> {
        self.search.loading()
    }

    pub fn search_state(&self) -> watch::Receiver<SearchState> {
        self.search.state()
    }

    pub fn search_errors(&self) -> broadcast::Receiver<SearchFailure> {
        self.search.subscribe_errors()
    }
}

impl Drop for Repository {
    fn drop(&mut self) {
        self.feed_task.abort();
    }
}
