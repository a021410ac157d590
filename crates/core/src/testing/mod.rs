//! Testing utilities and mock implementations.
//!
//! Provides a controllable [`MovieSearcher`](crate::remote::MovieSearcher)
//! and fixtures, so the sync engine can be exercised without the network.
//!
//! # Example
//!
//! ```rust,ignore
//! use moviebrowser_core::testing::{fixtures, MockSearcher};
//!
//! let searcher = MockSearcher::new();
//! searcher.set_results(vec![fixtures::raw_result(1, "Alien")]).await;
//! searcher.set_delay(Duration::from_millis(500)).await;
//! ```

mod mock_searcher;

pub use mock_searcher::{MockSearcher, RecordedSearch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::movie::{CacheEntry, Favorite, Movie, RawResult};

    /// Create a test movie with reasonable defaults.
    pub fn movie(id: i64, name: &str) -> Movie {
        Movie {
            id,
            name: name.to_string(),
            image_url: format!("https://example.com/{}/100x100bb.jpg", id),
            price: Some(9.99),
            currency: "AUD".to_string(),
            genre: "Drama".to_string(),
            long_description: format!("A movie about {}.", name.to_lowercase()),
            duration_ms: 7_200_000,
            release_date: "2001-06-15T07:00:00Z".to_string(),
            is_favorite: false,
        }
    }

    pub fn favorite(id: i64, name: &str) -> Favorite {
        Favorite::from(&movie(id, name))
    }

    /// Create a cache entry tagged with `keyword`.
    pub fn cache_entry(id: i64, name: &str, keyword: &str) -> CacheEntry {
        CacheEntry::from_movie(&movie(id, name), keyword)
    }

    /// Create a remote search result as the catalogue returns it.
    pub fn raw_result(id: i64, name: &str) -> RawResult {
        RawResult {
            track_id: id,
            track_name: name.to_string(),
            artwork_url: format!("https://example.com/{}/100x100bb.jpg", id),
            track_price: Some(9.99),
            currency: "AUD".to_string(),
            primary_genre_name: "Drama".to_string(),
            long_description: format!("A movie about {}.", name.to_lowercase()),
            track_time_millis: 7_200_000,
            release_date: "2001-06-15T07:00:00Z".to_string(),
        }
    }
}
