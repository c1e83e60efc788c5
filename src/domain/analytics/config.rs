//! Cost model used to price cache savings

use serde::{Deserialize, Serialize};

/// Pricing assumptions for the analytics report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Tokens a single backend call is assumed to consume
    #[serde(default = "default_avg_tokens_per_request")]
    pub avg_tokens_per_request: u64,

    /// Backend price per million tokens in USD
    #[serde(default = "default_cost_per_1m_tokens")]
    pub cost_per_1m_tokens: f64,
}

fn default_avg_tokens_per_request() -> u64 {
    3000
}

fn default_cost_per_1m_tokens() -> f64 {
    1.0
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            avg_tokens_per_request: default_avg_tokens_per_request(),
            cost_per_1m_tokens: default_cost_per_1m_tokens(),
        }
    }
}

impl AnalyticsConfig {
    pub fn new(avg_tokens_per_request: u64, cost_per_1m_tokens: f64) -> Self {
        Self {
            avg_tokens_per_request,
            cost_per_1m_tokens,
        }
    }

    /// Price of `tokens` tokens in USD
    pub fn cost_of(&self, tokens: u64) -> f64 {
        (tokens as f64 / 1_000_000.0) * self.cost_per_1m_tokens
    }
}
