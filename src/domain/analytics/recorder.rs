//! Hit/miss accounting

use serde::{Deserialize, Serialize};

use super::AnalyticsConfig;

/// Snapshot of the analytics counters and derived cost metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// hits / total requests, rounded to 2 decimals
    pub hit_rate: f64,
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// USD not spent thanks to hits, rounded to 2 decimals
    pub cost_savings: f64,
    /// floor(savings / cost without caching * 100)
    pub savings_percent: u64,
    /// Mean handling latency over all requests
    pub avg_latency_ms: f64,
}

/// Monotonic request counters. Only [`AnalyticsRecorder::reset`] (or
/// replacing the recorder) moves them backwards.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsRecorder {
    config: AnalyticsConfig,
    total_requests: u64,
    cache_hits: u64,
    cache_misses: u64,
    total_latency_ms: u64,
    tokens_saved: u64,
}

impl AnalyticsRecorder {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn record_hit(&mut self, latency_ms: u64, tokens_not_spent: u64) {
        self.total_requests += 1;
        self.cache_hits += 1;
        self.total_latency_ms = self.total_latency_ms.saturating_add(latency_ms);
        self.tokens_saved = self.tokens_saved.saturating_add(tokens_not_spent);
    }

    pub fn record_miss(&mut self, latency_ms: u64) {
        self.total_requests += 1;
        self.cache_misses += 1;
        self.total_latency_ms = self.total_latency_ms.saturating_add(latency_ms);
    }

    pub fn report(&self) -> AnalyticsReport {
        let hit_rate = if self.total_requests == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total_requests as f64
        };

        let baseline_tokens = self
            .total_requests
            .saturating_mul(self.config.avg_tokens_per_request);
        let total_cost = self.config.cost_of(baseline_tokens);
        let savings = self.config.cost_of(self.tokens_saved);

        // The price per token cancels out, so the percentage is computed on
        // token counts to avoid floating point truncation at whole percents.
        let savings_percent = if total_cost > 0.0 && baseline_tokens > 0 {
            self.tokens_saved.saturating_mul(100) / baseline_tokens
        } else {
            0
        };

        let avg_latency_ms = if self.total_requests == 0 {
            0.0
        } else {
            round2(self.total_latency_ms as f64 / self.total_requests as f64)
        };

        AnalyticsReport {
            hit_rate: round2(hit_rate),
            total_requests: self.total_requests,
            cache_hits: self.cache_hits,
            cache_misses: self.cache_misses,
            cost_savings: round2(savings),
            savings_percent,
            avg_latency_ms,
        }
    }
}

/// Round to two decimals, ties to even
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
