//! Cache infrastructure - In-memory store and the engine built on it

mod engine;
mod eviction;
mod semantic_index;
mod store;
mod sweeper;

pub use engine::{CacheEngine, EngineStats};
pub use eviction::{Eviction, EvictionManager, EvictionReason};
pub use semantic_index::{find_nearest, SemanticMatch};
pub use store::{SemanticHit, Store};
pub use sweeper::spawn_expiry_sweeper;
