use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// The slow generative call made on a full cache miss
#[async_trait]
pub trait AnswerBackend: Send + Sync + Debug {
    /// Produce an answer for the raw (un-normalized) query
    async fn answer(&self, query: &str) -> Result<String, DomainError>;

    /// Get the backend name
    fn backend_name(&self) -> &'static str;
}
