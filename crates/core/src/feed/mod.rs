//! Unified presentation feed.
//!
//! Combines favorites, the cache table and a manual republish tick into one
//! continuously updated `FeedSnapshot`, applying the keyword selection policy.

mod combinator;
mod signal;
mod types;

pub use combinator::{feed_stream, FeedCombinator};
pub use signal::RepublishSignal;
pub use types::*;
