//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_backend_failure, record_cache_lookup,
    record_eviction, record_request_duration, set_cache_entries, PrometheusMetrics,
};
