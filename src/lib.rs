//! PMP Query Cache
//!
//! Response cache for a slow question-answering backend:
//! - Exact lookup on normalized query text
//! - Semantic lookup by embedding cosine similarity
//! - LRU capacity limit and per-entry TTL
//! - Hit/miss and cost-savings analytics

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::AnswerBackend;
use infrastructure::cache::CacheEngine;
use infrastructure::embedding::EmbeddingProviderFactory;
use infrastructure::llm::SimulatedBackend;
use tracing::info;

/// Create the application state with default configuration
pub fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default())
}

/// Create the application state with custom configuration
pub fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let embedding_provider = EmbeddingProviderFactory::create(
        &config.embedding,
        config.cache.embedding_dimension,
        config.cache.embedding_timeout(),
    )?;

    info!(
        provider = embedding_provider.provider_name(),
        dimensions = embedding_provider.dimensions(),
        "Embedding provider ready"
    );

    let engine = CacheEngine::new(
        config.cache.clone(),
        config.analytics.clone(),
        embedding_provider,
    )?;

    info!(
        max_entries = config.cache.max_entries,
        ttl_secs = config.cache.ttl_secs,
        similarity_threshold = config.cache.similarity_threshold,
        "Cache engine ready"
    );

    let backend: Arc<dyn AnswerBackend> = Arc::new(SimulatedBackend::from_config(&config.backend));

    Ok(AppState::new(Arc::new(engine), backend))
}
