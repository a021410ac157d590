//! Types for the unified feed.

use serde::{Deserialize, Serialize};

use crate::movie::Movie;

/// What the presentation layer should show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedState {
    /// Movies to list, annotated with favorite status.
    Success { movies: Vec<Movie> },
    /// A search is active but found nothing.
    NoResults,
    /// No search is active and there are no favorites.
    NoFavorites,
    /// The last search failed; shown until the next recomputation.
    Error { code: i32, message: String },
}

impl FeedState {
    /// Placeholder text for the empty and error states.
    pub fn message(&self) -> Option<&str> {
        match self {
            FeedState::Success { .. } => None,
            FeedState::NoResults => Some("No Results Found"),
            FeedState::NoFavorites => Some("No Favorites Yet"),
            FeedState::Error { message, .. } => Some(message.as_str()),
        }
    }

    /// Movies in a success state, empty otherwise.
    pub fn movies(&self) -> &[Movie] {
        match self {
            FeedState::Success { movies } => movies.as_slice(),
            _ => &[],
        }
    }
}

/// One emission of the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    /// Keyword of the cache rows this snapshot was built from, empty when
    /// showing favorites.
    pub keyword: String,
    pub state: FeedState,
}

impl Default for FeedSnapshot {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            state: FeedState::NoFavorites,
        }
    }
}
