//! Time source used for TTL and recency decisions
//!
//! The cache never calls `Instant::now()` directly so that expiry can be
//! driven deterministically from tests.

use std::fmt::Debug;
use std::time::Instant;

/// Monotonic time source
pub trait Clock: Send + Sync + Debug {
    /// Current instant
    fn now(&self) -> Instant;
}

/// Clock backed by the OS monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
