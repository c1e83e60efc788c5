//! Request and response types of the HTTP surface

pub mod analytics;
pub mod error;
pub mod json;
pub mod query;

pub use analytics::{AnalyticsResponse, ResetResponse, STRATEGIES};
pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use query::{QueryRequest, QueryResponse};
