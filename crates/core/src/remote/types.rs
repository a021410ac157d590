//! Types for the remote search endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::movie::RawResult;

/// Parameters for a remote search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text search term.
    pub term: String,
    /// Store country code (e.g., "au").
    pub country: String,
    /// Media type (e.g., "movie").
    pub media: String,
}

/// Response body of the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub result_count: u32,
    #[serde(default)]
    pub results: Vec<RawResult>,
}

/// Errors that can occur during a remote search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("Connection failed: {0}")]
    Connectivity(String),

    #[error("Remote search failed: {0}")]
    Failure(String),

    #[error("Search cancelled")]
    Cancelled,
}

impl RemoteError {
    /// Code reported for connectivity failures.
    pub const CONNECTIVITY_CODE: i32 = -1;
    /// Code reported for any other failure.
    pub const FAILURE_CODE: i32 = -2;

    /// User-facing error code, `None` for cancellation.
    pub fn code(&self) -> Option<i32> {
        match self {
            RemoteError::Connectivity(_) => Some(Self::CONNECTIVITY_CODE),
            RemoteError::Failure(_) => Some(Self::FAILURE_CODE),
            RemoteError::Cancelled => None,
        }
    }

    /// User-facing message, `None` for cancellation.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            RemoteError::Connectivity(_) => Some("No internet connection"),
            RemoteError::Failure(_) => Some("Something went wrong"),
            RemoteError::Cancelled => None,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteError::Connectivity(_) => "connectivity",
            RemoteError::Failure(_) => "failure",
            RemoteError::Cancelled => "cancelled",
        }
    }
}

/// Trait for remote movie search backends.
#[async_trait]
pub trait MovieSearcher: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Run a search and return raw results.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawResult>, RemoteError>;
}
