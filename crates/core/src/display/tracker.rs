//! Display tracker implementation.

use std::sync::Arc;

use tracing::{debug, info};

use crate::metrics::CACHE_COMMITS;
use crate::movie::Movie;
use crate::store::{MovieStore, StoreError};

/// Maintains the displayed slot over a [`MovieStore`].
#[derive(Clone)]
pub struct DisplayTracker {
    store: Arc<dyn MovieStore>,
}

impl DisplayTracker {
    pub fn new(store: Arc<dyn MovieStore>) -> Self {
        Self { store }
    }

    /// Flag `id` as displayed, seeding the cache from favorites if it is empty.
    ///
    /// Returns false if no cache row has that id afterwards; nothing is
    /// displayed in that case.
    pub fn set_displayed(&self, id: i64) -> Result<bool, StoreError> {
        if self.store.seed_cache_from_favorites()? {
            CACHE_COMMITS.with_label_values(&["favorites_seed"]).inc();
            info!(id, "Seeded cache from favorites");
        }

        let found = self.store.set_displayed(id)?;
        if found {
            debug!(id, "Displayed movie set");
        } else {
            debug!(id, "No cached movie to display");
        }
        Ok(found)
    }

    /// Clear the displayed flag. No-op if nothing is displayed.
    pub fn clear_displayed(&self) -> Result<(), StoreError> {
        self.store.clear_displayed()
    }

    /// The displayed movie, annotated with its current favorite status.
    pub fn get_displayed(&self) -> Result<Option<Movie>, StoreError> {
        let Some(entry) = self.store.get_displayed()? else {
            return Ok(None);
        };

        let is_favorite = self
            .store
            .favorites()?
            .iter()
            .any(|favorite| favorite.id == entry.id);

        Ok(Some(entry.to_movie().with_favorite(is_favorite)))
    }
}
