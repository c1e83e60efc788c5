//! Cache entry and its lifecycle

use std::time::{Duration, Instant};

/// Lifecycle of an entry. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Age is within the TTL
    Fresh,
    /// Age exceeds the TTL; invisible to lookups, awaiting removal
    Stale,
}

/// A cached answer keyed by its normalized query
#[derive(Debug, Clone)]
pub struct CacheEntry {
    normalized_key: String,
    embedding: Vec<f32>,
    answer: String,
    created_at: Instant,
    last_accessed_at: Instant,
    ttl: Duration,
    /// Insertion order, used to break similarity ties deterministically
    sequence: u64,
}

impl CacheEntry {
    /// Create a new entry; `created_at` and `last_accessed_at` both start at `now`
    pub fn new(
        normalized_key: impl Into<String>,
        embedding: Vec<f32>,
        answer: impl Into<String>,
        now: Instant,
        ttl: Duration,
    ) -> Self {
        Self {
            normalized_key: normalized_key.into(),
            embedding,
            answer: answer.into(),
            created_at: now,
            last_accessed_at: now,
            ttl,
            sequence: 0,
        }
    }

    pub(crate) fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn normalized_key(&self) -> &str {
        &self.normalized_key
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn last_accessed_at(&self) -> Instant {
        self.last_accessed_at
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// State of the entry at `now`. An entry is stale once its age strictly
    /// exceeds the TTL.
    pub fn state_at(&self, now: Instant) -> EntryState {
        if now.saturating_duration_since(self.created_at) > self.ttl {
            EntryState::Stale
        } else {
            EntryState::Fresh
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.state_at(now) == EntryState::Stale
    }

    /// Mark the entry as used at `now`
    pub fn touch(&mut self, now: Instant) {
        self.last_accessed_at = now;
    }
}
