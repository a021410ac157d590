//! Remote movie search abstraction.
//!
//! This module provides a `MovieSearcher` trait for the remote search
//! endpoint and an iTunes Search API implementation.

mod itunes;
mod types;

pub use itunes::ItunesClient;
pub use types::*;
