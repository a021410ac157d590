//! Types for search orchestration.

use serde::{Deserialize, Serialize};

use crate::remote::RemoteError;

/// A surfaced search error with a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFailure {
    pub code: i32,
    pub message: String,
}

impl SearchFailure {
    /// Build the surfaced form of `error`, `None` for cancellation.
    pub fn from_error(error: &RemoteError) -> Option<Self> {
        Some(Self {
            code: error.code()?,
            message: error.user_message()?.to_string(),
        })
    }
}

/// Search session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SearchState {
    /// No search is pending or running.
    #[default]
    Idle,
    /// Waiting out the debounce interval.
    Pending { query: String },
    /// Remote call in progress.
    InFlight { query: String },
    /// Last attempt committed `count` results.
    Succeeded { query: String, count: usize },
    /// Last attempt failed; the cache was left untouched.
    Failed { query: String, failure: SearchFailure },
}
