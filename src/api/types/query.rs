//! Query endpoint request and response bodies

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::{CacheKeyKind, CacheOutcome};

/// Body of `POST /`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QueryRequest {
    #[validate(custom(function = "not_blank"))]
    pub query: String,

    /// Name of the calling application, used for logging only
    #[validate(length(min = 1, message = "application must not be empty"))]
    pub application: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("query must not be blank".into()));
    }

    Ok(())
}

/// Response of `POST /`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub answer: String,
    pub cached: bool,
    /// Milliseconds spent handling the request
    pub latency: u64,
    /// `exact`, `semantic` or null on a miss
    pub cache_key: Option<CacheKeyKind>,
}

impl From<CacheOutcome> for QueryResponse {
    fn from(outcome: CacheOutcome) -> Self {
        Self {
            cached: outcome.is_cached(),
            answer: outcome.answer,
            latency: outcome.latency_ms,
            cache_key: outcome.kind,
        }
    }
}
