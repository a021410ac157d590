//! Persistent store for favorites and the search/display cache.
//!
//! Both collections are observable: every committed write publishes the full
//! table snapshot on a `watch` channel. Multi-row writes are committed as one
//! transaction and published once, so observers never see a half-applied
//! replacement.

mod sqlite;
mod types;

pub use sqlite::SqliteMovieStore;
pub use types::*;

use tokio::sync::watch;

use crate::movie::{CacheEntry, Favorite};

/// Trait for movie storage.
pub trait MovieStore: Send + Sync {
    /// Insert a favorite, replacing any existing row with the same id.
    fn upsert_favorite(&self, favorite: &Favorite) -> Result<(), StoreError>;

    /// Delete the favorite with the given id. Deleting a missing id is a no-op.
    fn delete_favorite(&self, id: i64) -> Result<(), StoreError>;

    /// Current favorites.
    fn favorites(&self) -> Result<Vec<Favorite>, StoreError>;

    /// Subscribe to favorites snapshots.
    fn observe_favorites(&self) -> watch::Receiver<Vec<Favorite>>;

    /// Atomically clear the cache table and insert `entries`.
    fn replace_all_cache_entries(&self, entries: &[CacheEntry]) -> Result<(), StoreError>;

    /// If the cache is empty, atomically fill it with every favorite tagged
    /// with an empty keyword.
    ///
    /// Returns true if the cache was seeded; false if it was non-empty or
    /// there are no favorites to copy.
    fn seed_cache_from_favorites(&self) -> Result<bool, StoreError>;

    /// Flag the row with `id` as displayed, unflagging any other row.
    ///
    /// Returns false (and changes nothing) if no row has that id.
    fn set_displayed(&self, id: i64) -> Result<bool, StoreError>;

    /// Unflag whichever row is displayed, if any.
    fn clear_displayed(&self) -> Result<(), StoreError>;

    /// The displayed row, if any.
    fn get_displayed(&self) -> Result<Option<CacheEntry>, StoreError>;

    /// Delete every cache row.
    fn clear_all_cache_entries(&self) -> Result<(), StoreError>;

    /// Current cache rows in insertion order.
    fn cache_entries(&self) -> Result<Vec<CacheEntry>, StoreError>;

    /// Whether the cache table has no rows.
    fn is_cache_empty(&self) -> Result<bool, StoreError>;

    /// Subscribe to cache snapshots.
    fn observe_cache_entries(&self) -> watch::Receiver<Vec<CacheEntry>>;
}
