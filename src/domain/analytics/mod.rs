//! Cache analytics: request counters and cost-savings reporting

mod config;
mod recorder;

pub use config::AnalyticsConfig;
pub use recorder::{AnalyticsRecorder, AnalyticsReport};
