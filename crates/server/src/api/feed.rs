//! Feed API handlers.

use std::sync::Arc;

use axum::{extract::State, Json};
use moviebrowser_core::{FeedSnapshot, SearchState};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LoadingResponse {
    pub loading: bool,
    pub search: SearchState,
}

/// GET /api/v1/feed
///
/// The latest unified feed snapshot.
pub async fn get_feed(State(state): State<Arc<AppState>>) -> Json<FeedSnapshot> {
    Json(state.repository().current_feed())
}

/// GET /api/v1/loading
///
/// Whether a remote search is in flight, with the search session state.
pub async fn get_loading(State(state): State<Arc<AppState>>) -> Json<LoadingResponse> {
    let repository = state.repository();
    let loading = *repository.loading().borrow();
    let search = repository.search_state().borrow().clone();
    Json(LoadingResponse { loading, search })
}
