//! Embedding provider implementations

mod factory;
mod hashed;
mod openai;

pub use factory::{EmbeddingProviderFactory, EmbeddingProviderType, EmbeddingSettings};
pub use hashed::HashedEmbeddingProvider;
pub use openai::OpenAiEmbeddingProvider;
