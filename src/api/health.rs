//! Health check endpoints for Kubernetes probes

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::types::Json;

/// Health response with the cache's current size
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_entries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Reports unhealthy when the cache state cannot be read
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (status_code, response) = match state.engine.len() {
        Ok(entries) => (
            StatusCode::OK,
            HealthResponse {
                status: HealthStatus::Healthy,
                version: env!("CARGO_PKG_VERSION").to_string(),
                cache_entries: Some(entries),
                message: None,
            },
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthResponse {
                status: HealthStatus::Unhealthy,
                version: env!("CARGO_PKG_VERSION").to_string(),
                cache_entries: None,
                message: Some(e.to_string()),
            },
        ),
    };

    (status_code, Json(response))
}

/// Liveness check - the process is up and serving
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}
