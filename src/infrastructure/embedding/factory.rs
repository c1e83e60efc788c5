//! Embedding provider selection from configuration

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::{HashedEmbeddingProvider, OpenAiEmbeddingProvider};
use crate::domain::{DomainError, EmbeddingProvider};
use crate::infrastructure::llm::HttpClient;

/// Supported embedding providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderType {
    /// Offline feature hashing
    #[default]
    Hashed,
    /// OpenAI-compatible HTTP API
    #[serde(rename = "openai", alias = "open_ai")]
    OpenAi,
}

impl std::fmt::Display for EmbeddingProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hashed => write!(f, "hashed"),
            Self::OpenAi => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for EmbeddingProviderType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hashed" | "hash" => Ok(Self::Hashed),
            "openai" | "open_ai" => Ok(Self::OpenAi),
            _ => Err(DomainError::configuration(format!(
                "Unknown embedding provider: {}. Valid providers: hashed, openai",
                s
            ))),
        }
    }
}

/// Embedding section of the application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default)]
    pub provider: EmbeddingProviderType,

    /// Model name sent to the remote API
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL override for OpenAI-compatible servers
    #[serde(default)]
    pub base_url: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderType::default(),
            model: default_model(),
            base_url: None,
            api_key_env: default_api_key_env(),
        }
    }
}

/// Factory for creating embedding providers
#[derive(Debug)]
pub struct EmbeddingProviderFactory;

impl EmbeddingProviderFactory {
    /// Create the configured provider producing `dimensions`-long vectors
    pub fn create(
        settings: &EmbeddingSettings,
        dimensions: usize,
        timeout: Duration,
    ) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        match settings.provider {
            EmbeddingProviderType::Hashed => {
                Ok(Arc::new(HashedEmbeddingProvider::new(dimensions)?))
            }
            EmbeddingProviderType::OpenAi => {
                let api_key = std::env::var(&settings.api_key_env).map_err(|_| {
                    DomainError::configuration(format!(
                        "Embedding provider 'openai' requires the {} environment variable",
                        settings.api_key_env
                    ))
                })?;

                let client = HttpClient::with_timeout(timeout)?;

                let provider = match settings.base_url {
                    Some(ref base_url) => OpenAiEmbeddingProvider::with_base_url(
                        client,
                        api_key,
                        settings.model.clone(),
                        dimensions,
                        base_url.clone(),
                    ),
                    None => OpenAiEmbeddingProvider::new(
                        client,
                        api_key,
                        settings.model.clone(),
                        dimensions,
                    ),
                };

                Ok(Arc::new(provider))
            }
        }
    }
}
