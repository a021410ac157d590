use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use moviebrowser_core::{Config, RemoteError, StoreError};
use serde::Serialize;
use std::sync::Arc;

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Surfaced search error code, for remote failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn store_error(e: StoreError) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
            code: None,
        }),
    )
}

pub fn not_found(message: String) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message,
            code: None,
        }),
    )
}

/// Map a remote error to its surfaced message and a gateway status.
pub fn remote_error(e: &RemoteError) -> ApiError {
    let status = match e {
        RemoteError::Connectivity(_) => StatusCode::SERVICE_UNAVAILABLE,
        RemoteError::Failure(_) => StatusCode::BAD_GATEWAY,
        RemoteError::Cancelled => StatusCode::CONFLICT,
    };
    (
        status,
        Json(ErrorResponse {
            error: e
                .user_message()
                .map(str::to_string)
                .unwrap_or_else(|| "Search superseded".to_string()),
            code: e.code(),
        }),
    )
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Config> {
    Json(state.config().clone())
}

/// GET /metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
