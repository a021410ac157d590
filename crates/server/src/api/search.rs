//! Search API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use moviebrowser_core::Movie;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::handlers::{remote_error, store_error, ApiError, SuccessResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub count: usize,
    pub movies: Vec<Movie>,
}

#[derive(Debug, Deserialize)]
pub struct SearchInputRequest {
    pub input: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/search
///
/// Search immediately and replace the cache with the results.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let movies = state
        .repository()
        .search(&request.query)
        .await
        .map_err(|e| remote_error(&e))?;

    Ok(Json(SearchResponse {
        query: request.query,
        count: movies.len(),
        movies,
    }))
}

/// POST /api/v1/search/input
///
/// Report a change of the search box text. The search runs after the
/// debounce interval; results arrive through the feed.
pub async fn search_input(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchInputRequest>,
) -> StatusCode {
    debug!(input = %request.input, "Search input changed");
    state.repository().on_search_changed(&request.input).await;
    StatusCode::ACCEPTED
}

/// DELETE /api/v1/cache
///
/// Clear cached search results so the feed falls back to favorites.
pub async fn clear_cache(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.repository().clear_cache().map_err(store_error)?;
    Ok(Json(SuccessResponse {
        message: "Cache cleared".to_string(),
    }))
}
