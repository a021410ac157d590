use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{display, favorites, feed, handlers, middleware::metrics_middleware, search, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Feed
        .route("/feed", get(feed::get_feed))
        .route("/feed/ws", get(ws::ws_handler))
        .route("/loading", get(feed::get_loading))
        // Search
        .route("/search", post(search::search))
        .route("/search/input", post(search::search_input))
        .route("/cache", delete(search::clear_cache))
        // Displayed movie
        .route("/displayed", get(display::get_displayed))
        .route("/displayed", delete(display::clear_displayed))
        .route("/displayed/{id}", put(display::set_displayed))
        // Favorites
        .route("/favorites", get(favorites::list_favorites))
        .route("/favorites", post(favorites::add_favorite))
        .route("/favorites/{id}", delete(favorites::remove_favorite));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
