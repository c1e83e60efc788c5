//! Analytics and reset response bodies

use serde::{Deserialize, Serialize};

use crate::infrastructure::cache::EngineStats;

/// Caching techniques this service applies, as reported by `GET /analytics`
pub const STRATEGIES: [&str; 4] = [
    "exact match",
    "semantic similarity",
    "LRU eviction",
    "TTL expiration",
];

pub const RESET_MESSAGE: &str = "Cache and analytics cleared";

/// Response of `GET /analytics`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub hit_rate: f64,
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cost_savings: f64,
    pub savings_percent: u64,
    pub avg_latency_ms: f64,
    pub cache_size: usize,
    pub strategies: Vec<String>,
}

impl From<EngineStats> for AnalyticsResponse {
    fn from(stats: EngineStats) -> Self {
        let report = stats.report;

        Self {
            hit_rate: report.hit_rate,
            total_requests: report.total_requests,
            cache_hits: report.cache_hits,
            cache_misses: report.cache_misses,
            cost_savings: report.cost_savings,
            savings_percent: report.savings_percent,
            avg_latency_ms: report.avg_latency_ms,
            cache_size: stats.cache_size,
            strategies: STRATEGIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Response of `POST /reset`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResetResponse {
    pub status: String,
    pub message: String,
}

impl ResetResponse {
    pub fn done() -> Self {
        Self {
            status: "reset".to_string(),
            message: RESET_MESSAGE.to_string(),
        }
    }
}
