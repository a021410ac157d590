//! Tracking of the single "currently displayed" movie.
//!
//! At most one cache entry carries the displayed flag. Displaying a movie
//! while the cache is empty first mirrors the favorites into the cache, so
//! the detail view always has a row to point at.

mod tracker;

pub use tracker::DisplayTracker;
