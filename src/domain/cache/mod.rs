//! Cache domain models
//!
//! Exact-key and embedding-based lookup of previously generated answers.

mod config;
mod entry;
mod normalizer;
mod outcome;

pub use config::{CacheConfig, DEFAULT_EMBEDDING_DIMENSION, DEFAULT_SIMILARITY_THRESHOLD};
pub use entry::{CacheEntry, EntryState};
pub use normalizer::normalize;
pub use outcome::{CacheKeyKind, CacheOutcome};
