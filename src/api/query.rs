//! Cached query endpoint

use std::sync::Arc;

use axum::extract::State;
use tracing::info;
use validator::Validate;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, QueryRequest, QueryResponse};

/// POST /
pub async fn submit_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    request.validate()?;

    let backend = Arc::clone(&state.backend);
    let query = request.query.clone();

    let outcome = state
        .engine
        .handle(&request.query, || async move { backend.answer(&query).await })
        .await?;

    info!(
        application = %request.application,
        cached = outcome.is_cached(),
        cache_key = outcome.kind.map(|kind| kind.as_str()).unwrap_or("none"),
        latency_ms = outcome.latency_ms,
        "Query answered"
    );

    Ok(Json(QueryResponse::from(outcome)))
}
