//! Entry table with exact and semantic lookup

use std::collections::HashMap;
use std::time::Instant;

use super::eviction::{Eviction, EvictionManager};
use super::semantic_index::find_nearest;
use crate::domain::cache::CacheEntry;

/// A semantic lookup hit
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticHit {
    /// Key of the entry that matched
    pub key: String,
    pub answer: String,
    pub similarity: f32,
}

/// Owns every cache entry. Lookups hand out copies of answers only.
#[derive(Debug)]
pub struct Store {
    entries: HashMap<String, CacheEntry>,
    eviction: EvictionManager,
    next_sequence: u64,
}

impl Store {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            eviction: EvictionManager::new(max_entries),
            next_sequence: 0,
        }
    }

    /// Physically present entries, stale ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries a lookup at `now` could return
    pub fn live_len(&self, now: Instant) -> usize {
        self.entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub fn max_entries(&self) -> usize {
        self.eviction.max_entries()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Exact lookup. A stale entry is removed and reported as absent; a hit
    /// refreshes the entry's recency.
    pub fn lookup_exact(&mut self, key: &str, now: Instant) -> Option<String> {
        let expired = self.entries.get(key)?.is_expired(now);

        if expired {
            self.eviction.expire(&mut self.entries, key);
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.touch(now);
        let answer = entry.answer().to_string();
        self.eviction.on_access(key);

        Some(answer)
    }

    /// Semantic lookup over live entries. A hit refreshes the matched
    /// entry's recency.
    pub fn lookup_semantic(
        &mut self,
        query: &[f32],
        threshold: f32,
        now: Instant,
    ) -> Option<SemanticHit> {
        let live = self.entries.values().filter(|entry| !entry.is_expired(now));
        let found = find_nearest(live, query, threshold)?;
        let key = found.entry.normalized_key().to_string();
        let similarity = found.similarity;

        let entry = self.entries.get_mut(&key)?;
        entry.touch(now);
        let answer = entry.answer().to_string();
        self.eviction.on_access(&key);

        Some(SemanticHit {
            key,
            answer,
            similarity,
        })
    }

    /// Insert an entry at `now`. A full store sheds stale entries before
    /// evicting the least-recently-used one.
    pub fn insert(&mut self, entry: CacheEntry, now: Instant) -> Vec<Eviction> {
        let entry = entry.with_sequence(self.next_sequence);
        self.next_sequence += 1;

        self.eviction.on_insert(&mut self.entries, entry, now)
    }

    /// Eagerly remove every stale entry
    pub fn sweep_expired(&mut self, now: Instant) -> Vec<Eviction> {
        self.eviction.sweep_expired(&mut self.entries, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::eviction::EvictionReason;
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(60);

    fn entry(key: &str, embedding: Vec<f32>, now: Instant) -> CacheEntry {
        CacheEntry::new(key, embedding, format!("answer {}", key), now, TTL)
    }

    #[test]
    fn test_exact_hit_returns_copy_and_refreshes_recency() {
        let now = Instant::now();
        let mut store = Store::new(2);

        store.insert(entry("a", vec![1.0, 0.0], now), now);
        store.insert(entry("b", vec![0.0, 1.0], now), now);

        assert_eq!(store.lookup_exact("a", now), Some("answer a".to_string()));

        // "b" is now least recently used
        let evictions = store.insert(entry("c", vec![1.0, 1.0], now), now);
        assert_eq!(evictions.len(), 1);
        assert_eq!(evictions[0].key, "b");
        assert!(store.contains("a"));
    }

    #[test]
    fn test_exact_miss() {
        let mut store = Store::new(2);
        assert!(store.lookup_exact("nope", Instant::now()).is_none());
    }

    #[test]
    fn test_exact_lookup_drops_stale_entry() {
        let now = Instant::now();
        let mut store = Store::new(2);
        store.insert(entry("a", vec![1.0], now), now);

        let later = now + TTL + Duration::from_millis(1);

        assert!(store.lookup_exact("a", later).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_semantic_hit_refreshes_recency() {
        let now = Instant::now();
        let mut store = Store::new(2);

        store.insert(entry("a", vec![1.0, 0.0], now), now);
        store.insert(entry("b", vec![0.0, 1.0], now), now);

        let hit = store.lookup_semantic(&[1.0, 0.05], 0.9, now).unwrap();
        assert_eq!(hit.key, "a");
        assert_eq!(hit.answer, "answer a");
        assert!(hit.similarity > 0.99);

        let evictions = store.insert(entry("c", vec![1.0, 1.0], now), now);
        assert_eq!(evictions.len(), 1);
        assert_eq!(evictions[0].key, "b");
    }

    #[test]
    fn test_semantic_lookup_ignores_stale_entries() {
        let now = Instant::now();
        let mut store = Store::new(2);
        store.insert(entry("a", vec![1.0, 0.0], now), now);

        let later = now + TTL + Duration::from_secs(1);

        assert!(store.lookup_semantic(&[1.0, 0.0], 0.5, later).is_none());
        assert_eq!(store.live_len(later), 0);
    }

    #[test]
    fn test_semantic_below_threshold_misses() {
        let now = Instant::now();
        let mut store = Store::new(2);
        store.insert(entry("a", vec![1.0, 0.0], now), now);

        assert!(store.lookup_semantic(&[0.0, 1.0], 0.5, now).is_none());
    }

    #[test]
    fn test_sweep_removes_stale_entries() {
        let now = Instant::now();
        let mut store = Store::new(5);

        store.insert(CacheEntry::new("short", vec![1.0], "x", now, Duration::from_secs(1)), now);
        store.insert(entry("long", vec![1.0], now), now);

        let removed = store.sweep_expired(now + Duration::from_secs(2));
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].reason, EvictionReason::Ttl);
        assert_eq!(store.len(), 1);
        assert!(store.contains("long"));
    }

    #[test]
    fn test_full_store_keeps_live_entry_over_stale_recent_one() {
        let start = Instant::now();
        let ttl = Duration::from_secs(10);
        let mut store = Store::new(2);

        store.insert(CacheEntry::new("a", vec![1.0, 0.0], "answer a", start, ttl), start);
        let b_at = start + Duration::from_secs(9);
        store.insert(CacheEntry::new("b", vec![0.0, 1.0], "answer b", b_at, ttl), b_at);
        assert!(store.lookup_exact("a", start + Duration::from_millis(9_500)).is_some());

        let now = start + Duration::from_millis(11_500);
        store.insert(CacheEntry::new("c", vec![1.0, 1.0], "answer c", now, ttl), now);

        assert_eq!(store.len(), 2);
        assert_eq!(store.live_len(now), 2);
        assert!(!store.contains("a"));
        assert_eq!(store.lookup_exact("b", now), Some("answer b".to_string()));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let now = Instant::now();
        let mut store = Store::new(3);

        for i in 0..10 {
            store.insert(entry(&format!("k{}", i), vec![i as f32], now), now);
            assert!(store.len() <= store.max_entries());
        }

        assert_eq!(store.len(), 3);
        assert!(store.contains("k9"));
        assert!(!store.contains("k0"));
    }
}
