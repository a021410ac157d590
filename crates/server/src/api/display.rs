//! Displayed-movie API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use moviebrowser_core::Movie;

use super::handlers::{not_found, store_error, ApiError, SuccessResponse};
use crate::state::AppState;

/// GET /api/v1/displayed
pub async fn get_displayed(State(state): State<Arc<AppState>>) -> Result<Json<Movie>, ApiError> {
    match state.repository().get_displayed().map_err(store_error)? {
        Some(movie) => Ok(Json(movie)),
        None => Err(not_found("No movie displayed".to_string())),
    }
}

/// PUT /api/v1/displayed/{id}
///
/// Mark a cached (or favorite) movie as displayed and return it.
pub async fn set_displayed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Movie>, ApiError> {
    let repository = state.repository();

    if !repository.set_displayed(id).map_err(store_error)? {
        return Err(not_found(format!("Movie not found: {}", id)));
    }

    match repository.get_displayed().map_err(store_error)? {
        Some(movie) => Ok(Json(movie)),
        None => Err(not_found(format!("Movie not found: {}", id))),
    }
}

/// DELETE /api/v1/displayed
pub async fn clear_displayed(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.repository().clear_displayed().map_err(store_error)?;
    Ok(Json(SuccessResponse {
        message: "Displayed movie cleared".to_string(),
    }))
}
