//! Prometheus metrics infrastructure
//!
//! The recording helpers are safe to call before (or without) a recorder
//! being installed; the `metrics` facade drops the samples in that case.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;
use crate::infrastructure::cache::EvictionReason;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
    path: String,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("query_cache_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
                path: config.path.clone(),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics) -> Router {
    let path = metrics.path().to_string();

    Router::new()
        .route(&path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Count a lookup by result: `exact`, `semantic` or `miss`
pub fn record_cache_lookup(result: &'static str) {
    counter!("query_cache_lookups_total", "result" => result).increment(1);
}

/// Count an entry leaving the store
pub fn record_eviction(reason: EvictionReason) {
    counter!("query_cache_evictions_total", "reason" => reason.as_str()).increment(1);
}

/// Count a failed backend call by kind: `error` or `timeout`
pub fn record_backend_failure(kind: &'static str) {
    counter!("query_cache_backend_failures_total", "kind" => kind).increment(1);
}

/// Record end-to-end time spent answering one query
pub fn record_request_duration(duration: Duration) {
    histogram!("query_cache_request_duration_seconds").record(duration.as_secs_f64());
}

/// Publish the number of stored entries
pub fn set_cache_entries(count: usize) {
    gauge!("query_cache_entries").set(count as f64);
}
