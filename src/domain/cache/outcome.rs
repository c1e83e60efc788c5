//! Result of handling a query through the cache

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which lookup path produced a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKeyKind {
    Exact,
    Semantic,
}

impl CacheKeyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Semantic => "semantic",
        }
    }
}

impl fmt::Display for CacheKeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer returned by the engine together with how it was obtained
#[derive(Debug, Clone, PartialEq)]
pub struct CacheOutcome {
    /// Copy of the answer; never a reference into the store
    pub answer: String,
    /// `None` when the answer came from the backend
    pub kind: Option<CacheKeyKind>,
    /// Wall time spent handling the query in milliseconds
    pub latency_ms: u64,
}

impl CacheOutcome {
    pub fn hit(answer: impl Into<String>, kind: CacheKeyKind, latency_ms: u64) -> Self {
        Self {
            answer: answer.into(),
            kind: Some(kind),
            latency_ms,
        }
    }

    pub fn miss(answer: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            answer: answer.into(),
            kind: None,
            latency_ms,
        }
    }

    pub fn is_cached(&self) -> bool {
        self.kind.is_some()
    }
}
