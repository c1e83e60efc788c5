//! LRU and TTL eviction

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use tracing::debug;

use crate::domain::cache::CacheEntry;
use crate::infrastructure::observability::record_eviction;

/// Why an entry left the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// Capacity reached and the entry was least recently used
    Lru,
    /// Age exceeded the entry's TTL
    Ttl,
}

impl EvictionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lru => "lru",
            Self::Ttl => "ttl",
        }
    }
}

/// A removed entry's key and the reason for removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eviction {
    pub key: String,
    pub reason: EvictionReason,
}

/// Most-recently-used ordering keyed by a monotonically increasing tick
#[derive(Debug, Default)]
struct RecencyOrder {
    by_tick: BTreeMap<u64, String>,
    ticks: HashMap<String, u64>,
    next_tick: u64,
}

impl RecencyOrder {
    fn touch(&mut self, key: &str) {
        if let Some(old) = self.ticks.remove(key) {
            self.by_tick.remove(&old);
        }

        let tick = self.next_tick;
        self.next_tick += 1;
        self.by_tick.insert(tick, key.to_string());
        self.ticks.insert(key.to_string(), tick);
    }

    fn remove(&mut self, key: &str) {
        if let Some(tick) = self.ticks.remove(key) {
            self.by_tick.remove(&tick);
        }
    }

    fn least_recent(&self) -> Option<&str> {
        self.by_tick.values().next().map(String::as_str)
    }

    fn len(&self) -> usize {
        self.ticks.len()
    }
}

/// Enforces the entry-count limit (LRU) and per-entry TTL over a store's
/// entry table. Every mutation of the table goes through this manager so
/// the recency order never drifts from the table's key set.
#[derive(Debug)]
pub struct EvictionManager {
    recency: RecencyOrder,
    max_entries: usize,
}

impl EvictionManager {
    pub fn new(max_entries: usize) -> Self {
        Self {
            recency: RecencyOrder::default(),
            max_entries,
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Move `key` to the most-recently-used position
    pub fn on_access(&mut self, key: &str) {
        self.recency.touch(key);
    }

    /// Insert `entry` at `now`. When the table is full, stale entries are
    /// swept first and the least-recently-used entry is evicted only if no
    /// slot was freed. Replacing an existing key never evicts.
    pub fn on_insert(
        &mut self,
        entries: &mut HashMap<String, CacheEntry>,
        entry: CacheEntry,
        now: Instant,
    ) -> Vec<Eviction> {
        let key = entry.normalized_key().to_string();
        let mut evictions = Vec::new();

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            evictions = self.sweep_expired(entries, now);

            if entries.len() >= self.max_entries {
                if let Some(victim) = self.recency.least_recent().map(str::to_string) {
                    entries.remove(&victim);
                    self.recency.remove(&victim);
                    debug!(key = %victim, "Evicted least recently used entry");
                    record_eviction(EvictionReason::Lru);
                    evictions.push(Eviction {
                        key: victim,
                        reason: EvictionReason::Lru,
                    });
                }
            }
        }

        entries.insert(key.clone(), entry);
        self.recency.touch(&key);

        debug_assert!(
            entries.len() <= self.max_entries,
            "store holds {} entries, limit is {}",
            entries.len(),
            self.max_entries
        );
        debug_assert_eq!(entries.len(), self.recency.len());

        evictions
    }

    /// Remove `key` because it was found stale during a lookup
    pub fn expire(
        &mut self,
        entries: &mut HashMap<String, CacheEntry>,
        key: &str,
    ) -> Option<Eviction> {
        entries.remove(key)?;
        self.recency.remove(key);
        record_eviction(EvictionReason::Ttl);

        Some(Eviction {
            key: key.to_string(),
            reason: EvictionReason::Ttl,
        })
    }

    /// Remove every entry whose age exceeds its TTL at `now`
    pub fn sweep_expired(
        &mut self,
        entries: &mut HashMap<String, CacheEntry>,
        now: Instant,
    ) -> Vec<Eviction> {
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        expired
            .iter()
            .filter_map(|key| self.expire(entries, key))
            .collect()
    }

    /// Key that would be evicted next
    #[cfg(test)]
    fn least_recent(&self) -> Option<&str> {
        self.recency.least_recent()
    }
}
