//! Domain layer - Core cache types, traits and accounting

pub mod analytics;
pub mod cache;
pub mod clock;
pub mod embedding;
pub mod error;
pub mod llm;

pub use analytics::{AnalyticsConfig, AnalyticsRecorder, AnalyticsReport};
pub use cache::{
    normalize, CacheConfig, CacheEntry, CacheKeyKind, CacheOutcome, EntryState,
    DEFAULT_EMBEDDING_DIMENSION, DEFAULT_SIMILARITY_THRESHOLD,
};
pub use clock::{Clock, SystemClock};
pub use embedding::{cosine_similarity, EmbeddingProvider};
pub use error::DomainError;
pub use llm::AnswerBackend;
