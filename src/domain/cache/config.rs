//! Cache engine configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Minimum cosine similarity for a semantic hit. Equality counts as a hit.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.85;

/// Dimensionality of the default hashed embeddings
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;

/// Configuration for the cache engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries held at once (LRU beyond this)
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Time-to-live for entries in seconds, measured from creation
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Similarity threshold for semantic hits (0.0 to 1.0)
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Length of every embedding vector
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,

    /// Period of the eager expiry sweep; 0 disables it
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Upper bound on the backend call made on a miss
    #[serde(default = "default_backend_timeout_secs")]
    pub backend_timeout_secs: u64,

    /// Upper bound on a single embedding call
    #[serde(default = "default_embedding_timeout_ms")]
    pub embedding_timeout_ms: u64,
}

fn default_max_entries() -> usize {
    1000
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_similarity_threshold() -> f32 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_embedding_dimension() -> usize {
    DEFAULT_EMBEDDING_DIMENSION
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_backend_timeout_secs() -> u64 {
    30
}

fn default_embedding_timeout_ms() -> u64 {
    2000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            ttl_secs: default_ttl_secs(),
            similarity_threshold: default_similarity_threshold(),
            embedding_dimension: default_embedding_dimension(),
            sweep_interval_secs: default_sweep_interval_secs(),
            backend_timeout_secs: default_backend_timeout_secs(),
            embedding_timeout_ms: default_embedding_timeout_ms(),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }

    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_millis(self.embedding_timeout_ms)
    }

    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Whole seconds only; anything under one second fails validation
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = ttl.as_secs();
        self
    }

    /// Set the similarity threshold, clamped to [0, 1]
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_embedding_dimension(mut self, dimension: usize) -> Self {
        self.embedding_dimension = dimension;
        self
    }

    /// Whole seconds only; anything under one second fails validation
    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_embedding_timeout(mut self, timeout: Duration) -> Self {
        self.embedding_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_entries == 0 {
            return Err(DomainError::configuration("cache.max_entries must be at least 1"));
        }

        if self.embedding_dimension == 0 {
            return Err(DomainError::configuration(
                "cache.embedding_dimension must be at least 1",
            ));
        }

        if self.ttl_secs == 0 {
            return Err(DomainError::configuration("cache.ttl_secs must be at least 1"));
        }

        if self.backend_timeout_secs == 0 {
            return Err(DomainError::configuration(
                "cache.backend_timeout_secs must be at least 1",
            ));
        }

        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(DomainError::configuration(format!(
                "cache.similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }

        Ok(())
    }
}
