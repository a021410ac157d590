//! Favorites API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use moviebrowser_core::Movie;
use serde::Serialize;

use super::handlers::{store_error, ApiError, SuccessResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<Movie>,
    pub total: usize,
}

/// GET /api/v1/favorites
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FavoritesResponse>, ApiError> {
    let favorites = state.repository().favorites().map_err(store_error)?;
    let total = favorites.len();
    Ok(Json(FavoritesResponse { favorites, total }))
}

/// POST /api/v1/favorites
///
/// Store a movie as favorite. Re-adding replaces the stored fields.
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Json(movie): Json<Movie>,
) -> Result<(StatusCode, Json<Movie>), ApiError> {
    state.repository().add_favorite(&movie).map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(movie.with_favorite(true))))
}

/// DELETE /api/v1/favorites/{id}
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.repository().remove_favorite(id).map_err(store_error)?;
    Ok(Json(SuccessResponse {
        message: format!("Removed {} from favorites", id),
    }))
}
