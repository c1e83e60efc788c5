//! Analytics and reset endpoints

use axum::extract::State;

use crate::api::state::AppState;
use crate::api::types::{AnalyticsResponse, ApiError, Json, ResetResponse};

/// GET /analytics
pub async fn get_analytics(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let stats = state.engine.stats()?;

    Ok(Json(AnalyticsResponse::from(stats)))
}

/// POST /reset
pub async fn reset(State(state): State<AppState>) -> Result<Json<ResetResponse>, ApiError> {
    state.engine.reset()?;

    Ok(Json(ResetResponse::done()))
}
