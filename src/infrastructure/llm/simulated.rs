//! Stand-in for the slow generative model call

use async_trait::async_trait;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::domain::{AnswerBackend, DomainError};

/// Settings for the simulated backend
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Artificial delay before every answer
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
}

fn default_latency_ms() -> u64 {
    3000
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
        }
    }
}

/// Backend that waits a fixed time and returns a canned summary
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    latency: Duration,
}

impl SimulatedBackend {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(Duration::from_millis(config.latency_ms))
    }
}

#[async_trait]
impl AnswerBackend for SimulatedBackend {
    async fn answer(&self, query: &str) -> Result<String, DomainError> {
        debug!(latency_ms = self.latency.as_millis() as u64, "Simulating backend call");

        tokio::time::sleep(self.latency).await;

        Ok(format!("Summary for: {}", query))
    }

    fn backend_name(&self) -> &'static str {
        "simulated"
    }
}
