//! Periodic eager expiry

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

use super::CacheEngine;

/// Run [`CacheEngine::sweep_expired`] every `period` until the task is
/// aborted or the engine's last other owner is gone
pub fn spawn_expiry_sweeper(engine: Arc<CacheEngine>, period: Duration) -> JoinHandle<()> {
    let engine = Arc::downgrade(&engine);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(engine) = engine.upgrade() else {
                debug!("Cache engine dropped, stopping expiry sweeper");
                return;
            };

            if let Err(e) = engine.sweep_expired() {
                error!("Expiry sweep failed: {}", e);
            }
        }
    })
}
