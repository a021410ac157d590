//! Combine-latest merge of favorites, cache, republish tick and search state.

use std::collections::HashSet;

use futures::Stream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::metrics::FEED_RECOMPUTATIONS;
use crate::movie::{CacheEntry, Favorite};
use crate::search::SearchState;
use crate::store::MovieStore;

use super::{FeedSnapshot, FeedState, RepublishSignal};

/// Holds the latest value of every feed source and recomputes on any update.
pub struct FeedCombinator {
    favorites_rx: watch::Receiver<Vec<Favorite>>,
    cache_rx: watch::Receiver<Vec<CacheEntry>>,
    republish_rx: watch::Receiver<u64>,
    search_rx: watch::Receiver<SearchState>,
}

/// What woke the combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    Store,
    Republish,
    Search,
}

impl FeedCombinator {
    pub fn new(
        store: &dyn MovieStore,
        republish: &RepublishSignal,
        search_rx: watch::Receiver<SearchState>,
    ) -> Self {
        Self {
            favorites_rx: store.observe_favorites(),
            cache_rx: store.observe_cache_entries(),
            republish_rx: republish.subscribe(),
            search_rx,
        }
    }

    /// Apply the keyword selection policy to one pair of snapshots.
    ///
    /// The keyword comes from the same cache snapshot as the entries.
    pub fn select(favorites: &[Favorite], cache: &[CacheEntry]) -> FeedSnapshot {
        let keyword = cache
            .first()
            .map(|entry| entry.keyword.clone())
            .unwrap_or_default();

        let state = if keyword.is_empty() {
            if favorites.is_empty() {
                FeedState::NoFavorites
            } else {
                FeedState::Success {
                    movies: favorites
                        .iter()
                        .map(|favorite| favorite.to_movie().with_favorite(true))
                        .collect(),
                }
            }
        } else if cache.is_empty() {
            FeedState::NoResults
        } else {
            let favorite_ids: HashSet<i64> = favorites.iter().map(|f| f.id).collect();
            FeedState::Success {
                movies: cache
                    .iter()
                    .map(|entry| {
                        entry
                            .to_movie()
                            .with_favorite(favorite_ids.contains(&entry.id))
                    })
                    .collect(),
            }
        };

        FeedSnapshot { keyword, state }
    }

    /// Start the combinator task.
    ///
    /// The returned receiver already holds the snapshot for the current store
    /// contents. The task ends when a source closes or every receiver is gone.
    pub fn spawn(mut self) -> (watch::Receiver<FeedSnapshot>, JoinHandle<()>) {
        // A failure that is already current is not replayed.
        self.search_rx.borrow_and_update();
        let initial = Self::select(&self.favorites_rx.borrow(), &self.cache_rx.borrow());
        let (tx, rx) = watch::channel(initial);
        let handle = tokio::spawn(self.run(tx));
        (rx, handle)
    }

    async fn run(mut self, tx: watch::Sender<FeedSnapshot>) {
        debug!("Feed combinator started");

        loop {
            let wake = tokio::select! {
                changed = self.favorites_rx.changed() => changed.map(|_| Wake::Store),
                changed = self.cache_rx.changed() => changed.map(|_| Wake::Store),
                changed = self.republish_rx.changed() => changed.map(|_| Wake::Republish),
                changed = self.search_rx.changed() => changed.map(|_| Wake::Search),
            };
            let Ok(wake) = wake else {
                break;
            };

            // Every source is read in one pass, so a failure is only laid over
            // the cache it left untouched. A newer attempt replaces `Failed`
            // before it can commit, which drops the overlay.
            let search_changed =
                wake == Wake::Search || self.search_rx.has_changed().unwrap_or(false);
            let failure = match &*self.search_rx.borrow_and_update() {
                SearchState::Failed { failure, .. } if search_changed => Some(failure.clone()),
                _ => None,
            };
            let mut snapshot = {
                let favorites = self.favorites_rx.borrow_and_update();
                let cache = self.cache_rx.borrow_and_update();
                Self::select(&favorites, &cache)
            };
            self.republish_rx.borrow_and_update();

            if let Some(failure) = failure {
                snapshot.state = FeedState::Error {
                    code: failure.code,
                    message: failure.message,
                };
                tx.send_replace(snapshot);
            } else if wake == Wake::Search {
                // Pending and in-flight transitions only matter when they end an error.
                tx.send_if_modified(|current| {
                    if *current == snapshot {
                        return false;
                    }
                    *current = snapshot;
                    true
                });
            } else {
                tx.send_replace(snapshot);
            }
            FEED_RECOMPUTATIONS.inc();

            if tx.is_closed() {
                break;
            }
        }

        debug!("Feed combinator stopped");
    }
}

/// Expose a feed receiver as a stream that starts with the current snapshot.
pub fn feed_stream(rx: watch::Receiver<FeedSnapshot>) -> impl Stream<Item = FeedSnapshot> {
    futures::stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let snapshot = rx.borrow_and_update().clone();
        Some((snapshot, (rx, false)))
    })
}
