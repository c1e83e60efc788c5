//! Cache engine orchestrating normalization, lookup, insertion and analytics
//!
//! Locking model:
//! - All state lives in a `Generation`: the store, the analytics counters
//!   and the table of in-flight misses. `reset` swaps in a fresh generation
//!   atomically; a request keeps working against the generation it started
//!   with, so no request ever observes a half-cleared state.
//! - The store and analytics mutexes are only held for non-suspending work.
//!   The backend call on a miss runs without them.
//! - Misses are serialized per normalized key through an async lock, and the
//!   exact lookup is repeated once that lock is held. Concurrent identical
//!   queries therefore create at most one entry and call the backend once.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Instant;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use super::store::Store;
use crate::domain::analytics::{AnalyticsConfig, AnalyticsRecorder, AnalyticsReport};
use crate::domain::cache::{normalize, CacheConfig, CacheEntry, CacheKeyKind, CacheOutcome};
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;
use crate::infrastructure::observability::{
    record_backend_failure, record_cache_lookup, record_request_duration, set_cache_entries,
};

/// Consistent view of one generation's size and counters
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStats {
    pub report: AnalyticsReport,
    /// Live (non-expired) entries
    pub cache_size: usize,
}

#[derive(Debug)]
struct Generation {
    store: Mutex<Store>,
    analytics: Mutex<AnalyticsRecorder>,
    inflight: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl Generation {
    fn new(max_entries: usize, analytics: AnalyticsConfig) -> Self {
        Self {
            store: Mutex::new(Store::new(max_entries)),
            analytics: Mutex::new(AnalyticsRecorder::new(analytics)),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, Store>, DomainError> {
        self.store
            .lock()
            .map_err(|e| DomainError::cache(format!("Failed to acquire store lock: {}", e)))
    }

    fn analytics(&self) -> Result<MutexGuard<'_, AnalyticsRecorder>, DomainError> {
        self.analytics
            .lock()
            .map_err(|e| DomainError::internal(format!("Failed to acquire analytics lock: {}", e)))
    }

    /// Wait for exclusive ownership of the miss path for `key`
    async fn acquire_key(&self, key: &str) -> Result<KeySlot<'_>, DomainError> {
        let lock = {
            let mut inflight = self.inflight.lock().map_err(|e| {
                DomainError::internal(format!("Failed to acquire in-flight lock: {}", e))
            })?;
            inflight.entry(key.to_string()).or_default().clone()
        };

        let guard = lock.lock_owned().await;

        Ok(KeySlot {
            generation: self,
            key: key.to_string(),
            guard: Some(guard),
        })
    }

    fn release_key(&self, key: &str) {
        let Ok(mut inflight) = self.inflight.lock() else {
            return;
        };

        // Only the table's own reference left: nobody holds or awaits the key
        if inflight
            .get(key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            inflight.remove(key);
        }
    }
}

/// Held while a miss for one key is being resolved. Dropping it (also on
/// cancellation) releases the key.
struct KeySlot<'a> {
    generation: &'a Generation,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeySlot<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.generation.release_key(&self.key);
    }
}

/// In-memory response cache with exact and semantic lookup
#[derive(Debug)]
pub struct CacheEngine {
    config: CacheConfig,
    analytics_config: AnalyticsConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    clock: Arc<dyn Clock>,
    generation: RwLock<Arc<Generation>>,
}

impl CacheEngine {
    /// Create an engine; fails when the configuration is unusable or the
    /// provider's dimensionality disagrees with it
    pub fn new(
        config: CacheConfig,
        analytics_config: AnalyticsConfig,
        embedding_provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        if embedding_provider.dimensions() != config.embedding_dimension {
            return Err(DomainError::configuration(format!(
                "Embedding provider '{}' produces {} dimensions, cache expects {}",
                embedding_provider.provider_name(),
                embedding_provider.dimensions(),
                config.embedding_dimension
            )));
        }

        let generation = Generation::new(config.max_entries, analytics_config.clone());

        Ok(Self {
            config,
            analytics_config,
            embedding_provider,
            clock: Arc::new(SystemClock),
            generation: RwLock::new(Arc::new(generation)),
        })
    }

    /// Replace the time source used for TTL and recency
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn current(&self) -> Result<Arc<Generation>, DomainError> {
        self.generation
            .read()
            .map(|generation| Arc::clone(&generation))
            .map_err(|e| DomainError::internal(format!("Failed to acquire generation lock: {}", e)))
    }

    fn is_current(&self, generation: &Arc<Generation>) -> Result<bool, DomainError> {
        Ok(Arc::ptr_eq(generation, &self.current()?))
    }

    /// Answer `query` from the cache, or by awaiting `answer_if_miss` and
    /// caching its result.
    ///
    /// A failed or timed-out backend call is returned as an error; nothing
    /// is cached and no counters move.
    pub async fn handle<F, Fut>(
        &self,
        query: &str,
        answer_if_miss: F,
    ) -> Result<CacheOutcome, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, DomainError>>,
    {
        let started = Instant::now();
        let generation = self.current()?;
        let key = normalize(query);

        if let Some(answer) = self.lookup_exact(&generation, &key)? {
            return self.finish_hit(&generation, answer, CacheKeyKind::Exact, started);
        }

        let embedding = self.embed(&key).await;

        if let Some(ref vector) = embedding {
            if let Some(answer) = self.lookup_semantic(&generation, &key, vector)? {
                return self.finish_hit(&generation, answer, CacheKeyKind::Semantic, started);
            }
        }

        let _slot = generation.acquire_key(&key).await?;

        // Another request may have filled this key while we waited
        if let Some(answer) = self.lookup_exact(&generation, &key)? {
            return self.finish_hit(&generation, answer, CacheKeyKind::Exact, started);
        }

        let answer = self.call_backend(&key, answer_if_miss).await?;

        let now = self.clock.now();
        let entry = CacheEntry::new(
            key.as_str(),
            embedding.unwrap_or_default(),
            answer.as_str(),
            now,
            self.config.ttl(),
        );

        let size = {
            let mut store = generation.store()?;
            for eviction in store.insert(entry, now) {
                debug!(
                    evicted = %eviction.key,
                    reason = eviction.reason.as_str(),
                    "Evicted entry to make room"
                );
            }
            store.len()
        };
        // A reset while the backend ran leaves this generation detached
        if self.is_current(&generation)? {
            set_cache_entries(size);
        }

        let latency_ms = started.elapsed().as_millis() as u64;
        generation.analytics()?.record_miss(latency_ms);
        record_cache_lookup("miss");
        record_request_duration(started.elapsed());

        debug!(key = %key, latency_ms, "Cache miss, stored backend answer");

        Ok(CacheOutcome::miss(answer, latency_ms))
    }

    fn lookup_exact(&self, generation: &Generation, key: &str) -> Result<Option<String>, DomainError> {
        let now = self.clock.now();
        Ok(generation.store()?.lookup_exact(key, now))
    }

    fn lookup_semantic(
        &self,
        generation: &Generation,
        key: &str,
        vector: &[f32],
    ) -> Result<Option<String>, DomainError> {
        let now = self.clock.now();
        let hit = generation
            .store()?
            .lookup_semantic(vector, self.config.similarity_threshold, now);

        Ok(hit.map(|hit| {
            debug!(
                key = %key,
                matched = %hit.key,
                similarity = hit.similarity,
                "Semantic cache hit"
            );
            hit.answer
        }))
    }

    fn finish_hit(
        &self,
        generation: &Generation,
        answer: String,
        kind: CacheKeyKind,
        started: Instant,
    ) -> Result<CacheOutcome, DomainError> {
        let latency_ms = (started.elapsed().as_millis() as u64).max(1);

        generation
            .analytics()?
            .record_hit(latency_ms, self.analytics_config.avg_tokens_per_request);
        record_cache_lookup(kind.as_str());
        record_request_duration(started.elapsed());

        debug!(kind = %kind, latency_ms, "Cache hit");

        Ok(CacheOutcome::hit(answer, kind, latency_ms))
    }

    /// Embed the normalized key. Any failure means "no semantic candidate".
    async fn embed(&self, key: &str) -> Option<Vec<f32>> {
        let timeout = self.config.embedding_timeout();

        match tokio::time::timeout(timeout, self.embedding_provider.embed(key)).await {
            Ok(Ok(vector)) if vector.len() == self.config.embedding_dimension => Some(vector),
            Ok(Ok(vector)) => {
                warn!(
                    expected = self.config.embedding_dimension,
                    actual = vector.len(),
                    "Embedding has unexpected dimension, skipping semantic lookup"
                );
                None
            }
            Ok(Err(e)) => {
                warn!("Failed to generate embedding for cache lookup: {}", e);
                None
            }
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Embedding timed out, skipping semantic lookup"
                );
                None
            }
        }
    }

    async fn call_backend<F, Fut>(&self, key: &str, answer_if_miss: F) -> Result<String, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, DomainError>>,
    {
        let timeout = self.config.backend_timeout();

        match tokio::time::timeout(timeout, answer_if_miss()).await {
            Ok(Ok(answer)) => Ok(answer),
            Ok(Err(e)) => {
                warn!(key = %key, "Backend call failed, nothing cached: {}", e);
                record_backend_failure("error");
                Err(e)
            }
            Err(_) => {
                warn!(key = %key, "Backend call timed out, nothing cached");
                record_backend_failure("timeout");
                Err(DomainError::timeout("backend", timeout.as_millis() as u64))
            }
        }
    }

    /// Drop every entry and zero every counter in one step
    pub fn reset(&self) -> Result<(), DomainError> {
        let fresh = Arc::new(Generation::new(
            self.config.max_entries,
            self.analytics_config.clone(),
        ));

        let mut current = self
            .generation
            .write()
            .map_err(|e| DomainError::internal(format!("Failed to acquire generation lock: {}", e)))?;
        *current = fresh;
        drop(current);

        set_cache_entries(0);
        info!("Cache and analytics reset");

        Ok(())
    }

    /// Eagerly remove stale entries; returns how many were removed
    pub fn sweep_expired(&self) -> Result<usize, DomainError> {
        let generation = self.current()?;
        let now = self.clock.now();

        let (removed, size) = {
            let mut store = generation.store()?;
            let removed = store.sweep_expired(now).len();
            (removed, store.len())
        };
        set_cache_entries(size);

        if removed > 0 {
            info!(removed, remaining = size, "Swept expired cache entries");
        }

        Ok(removed)
    }

    /// Live entry count
    pub fn len(&self) -> Result<usize, DomainError> {
        let generation = self.current()?;
        let now = self.clock.now();
        Ok(generation.store()?.live_len(now))
    }

    pub fn is_empty(&self) -> Result<bool, DomainError> {
        Ok(self.len()? == 0)
    }

    pub fn report(&self) -> Result<AnalyticsReport, DomainError> {
        Ok(self.current()?.analytics()?.report())
    }

    /// Report and size taken from the same generation
    pub fn stats(&self) -> Result<EngineStats, DomainError> {
        let generation = self.current()?;
        let now = self.clock.now();
        let cache_size = generation.store()?.live_len(now);
        let report = generation.analytics()?.report();

        Ok(EngineStats { report, cache_size })
    }

    /// Physically stored entries, stale ones included
    #[cfg(test)]
    pub(crate) fn current_store_len(&self) -> usize {
        self.current().unwrap().store().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::mock::ManualClock;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::llm::MockAnswerBackend;
    use crate::domain::AnswerBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const DIM: usize = 4;

    fn engine_with(provider: MockEmbeddingProvider, config: CacheConfig) -> CacheEngine {
        CacheEngine::new(config, AnalyticsConfig::new(3000, 10.0), Arc::new(provider)).unwrap()
    }

    fn engine() -> CacheEngine {
        engine_with(
            MockEmbeddingProvider::new(DIM),
            CacheConfig::new().with_embedding_dimension(DIM),
        )
    }

    async fn ask(engine: &CacheEngine, query: &str) -> CacheOutcome {
        let owned = query.to_string();
        engine
            .handle(query, || async move { Ok(format!("Summary for: {}", owned)) })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_cold_start_is_a_miss() {
        let engine = engine();

        let outcome = ask(&engine, "What is Rust?").await;

        assert!(!outcome.is_cached());
        assert_eq!(outcome.kind, None);
        assert_eq!(outcome.answer, "Summary for: What is Rust?");
        assert_eq!(engine.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_repeat_query_is_exact_hit() {
        let engine = engine();

        let first = ask(&engine, "What is Rust?").await;
        let second = ask(&engine, "  what   IS rust? ").await;

        assert_eq!(second.kind, Some(CacheKeyKind::Exact));
        assert_eq!(second.answer, first.answer);
        assert!(second.latency_ms >= 1);
        assert_eq!(engine.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_semantic_hit_on_similar_vector() {
        let provider = MockEmbeddingProvider::new(DIM)
            .with_vector("what is rust?", vec![1.0, 0.0, 0.0, 0.0])
            .with_vector("tell me about rust", vec![0.95, 0.05, 0.0, 0.0]);
        let engine = engine_with(provider, CacheConfig::new().with_embedding_dimension(DIM));

        let first = ask(&engine, "What is Rust?").await;
        let second = ask(&engine, "Tell me about Rust").await;

        assert_eq!(second.kind, Some(CacheKeyKind::Semantic));
        assert_eq!(second.answer, first.answer);
        // semantic hits do not create a new entry
        assert_eq!(engine.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_semantic_threshold_boundary() {
        let stored = vec![1.0, 1.0, 0.0, 0.0];
        let probe = vec![1.0, 0.0, 0.0, 0.0];
        let similarity = crate::domain::cosine_similarity(&probe, &stored);

        let provider = || {
            MockEmbeddingProvider::new(DIM)
                .with_vector("stored", stored.clone())
                .with_vector("probe", probe.clone())
        };

        let at_threshold = engine_with(
            provider(),
            CacheConfig::new()
                .with_embedding_dimension(DIM)
                .with_similarity_threshold(similarity),
        );
        ask(&at_threshold, "stored").await;
        assert_eq!(
            ask(&at_threshold, "probe").await.kind,
            Some(CacheKeyKind::Semantic)
        );

        let above = engine_with(
            provider(),
            CacheConfig::new()
                .with_embedding_dimension(DIM)
                .with_similarity_threshold(f32::from_bits(similarity.to_bits() + 1)),
        );
        ask(&above, "stored").await;
        assert_eq!(ask(&above, "probe").await.kind, None);
    }

    #[tokio::test]
    async fn test_ttl_expiry_reports_miss() {
        let clock = Arc::new(ManualClock::new());
        let engine = engine_with(
            MockEmbeddingProvider::new(DIM),
            CacheConfig::new()
                .with_embedding_dimension(DIM)
                .with_ttl(Duration::from_secs(10)),
        )
        .with_clock(clock.clone());

        ask(&engine, "hello").await;

        clock.advance(Duration::from_secs(10));
        assert_eq!(ask(&engine, "hello").await.kind, Some(CacheKeyKind::Exact));

        clock.advance(Duration::from_millis(1));
        let outcome = ask(&engine, "hello").await;
        assert_eq!(outcome.kind, None);
    }

    #[tokio::test]
    async fn test_stale_entry_not_returned_semantically() {
        let clock = Arc::new(ManualClock::new());
        let provider = MockEmbeddingProvider::new(DIM)
            .with_vector("a", vec![1.0, 0.0, 0.0, 0.0])
            .with_vector("b", vec![1.0, 0.0, 0.0, 0.0]);
        let engine = engine_with(
            provider,
            CacheConfig::new()
                .with_embedding_dimension(DIM)
                .with_ttl(Duration::from_secs(5)),
        )
        .with_clock(clock.clone());

        ask(&engine, "a").await;
        clock.advance(Duration::from_secs(6));

        assert_eq!(ask(&engine, "b").await.kind, None);
    }

    fn exact_only(max_entries: usize) -> CacheEngine {
        engine_with(
            MockEmbeddingProvider::new(DIM).with_error("disabled"),
            CacheConfig::new()
                .with_embedding_dimension(DIM)
                .with_max_entries(max_entries),
        )
    }

    #[tokio::test]
    async fn test_lru_eviction_drops_least_recently_accessed() {
        let engine = exact_only(3);

        ask(&engine, "one").await;
        ask(&engine, "two").await;
        ask(&engine, "three").await;

        // touch "one" so "two" becomes least recently used
        assert_eq!(ask(&engine, "one").await.kind, Some(CacheKeyKind::Exact));

        ask(&engine, "four").await;
        assert_eq!(engine.len().unwrap(), 3);

        let generation = engine.current().unwrap();
        let store = generation.store().unwrap();
        assert!(!store.contains("two"));
        assert!(store.contains("one"));
        assert!(store.contains("three"));
        assert!(store.contains("four"));
    }

    #[tokio::test]
    async fn test_evicted_key_misses_afterwards() {
        let engine = exact_only(2);

        ask(&engine, "alpha").await;
        ask(&engine, "beta").await;
        ask(&engine, "gamma").await;

        assert_eq!(ask(&engine, "alpha").await.kind, None);
        assert_eq!(engine.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_full_store_sheds_stale_entry_before_live_one() {
        let clock = Arc::new(ManualClock::new());
        let engine = engine_with(
            MockEmbeddingProvider::new(DIM).with_error("disabled"),
            CacheConfig::new()
                .with_embedding_dimension(DIM)
                .with_max_entries(2)
                .with_ttl(Duration::from_secs(10)),
        )
        .with_clock(clock.clone());

        ask(&engine, "a").await;
        clock.advance(Duration::from_secs(9));
        ask(&engine, "b").await;
        clock.advance(Duration::from_millis(500));
        assert_eq!(ask(&engine, "a").await.kind, Some(CacheKeyKind::Exact));

        clock.advance(Duration::from_secs(2));
        ask(&engine, "c").await;

        assert_eq!(engine.len().unwrap(), 2);
        assert_eq!(engine.current_store_len(), 2);
        assert_eq!(ask(&engine, "b").await.kind, Some(CacheKeyKind::Exact));
    }

    #[tokio::test]
    async fn test_embedding_failure_degrades_to_exact_only() {
        let engine = engine_with(
            MockEmbeddingProvider::new(DIM).with_error("embedding service down"),
            CacheConfig::new().with_embedding_dimension(DIM),
        );

        assert_eq!(ask(&engine, "hello").await.kind, None);
        assert_eq!(ask(&engine, "hello").await.kind, Some(CacheKeyKind::Exact));
        assert_eq!(ask(&engine, "hello there").await.kind, None);
    }

    #[tokio::test]
    async fn test_embedding_timeout_degrades_to_exact_only() {
        let engine = engine_with(
            MockEmbeddingProvider::new(DIM).with_delay(Duration::from_millis(200)),
            CacheConfig::new()
                .with_embedding_dimension(DIM)
                .with_embedding_timeout(Duration::from_millis(10)),
        );

        assert_eq!(ask(&engine, "slow").await.kind, None);
        assert_eq!(engine.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_wrong_dimension_embedding_is_ignored() {
        let provider = MockEmbeddingProvider::new(DIM)
            .with_vector("a", vec![1.0, 0.0])
            .with_vector("b", vec![1.0, 0.0]);
        let engine = engine_with(provider, CacheConfig::new().with_embedding_dimension(DIM));

        ask(&engine, "a").await;
        assert_eq!(ask(&engine, "b").await.kind, None);
    }

    #[tokio::test]
    async fn test_backend_failure_caches_nothing() {
        let engine = engine();
        let backend = MockAnswerBackend::new().with_error("model overloaded");

        let result = engine.handle("hello", || backend.answer("hello")).await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
        assert_eq!(engine.len().unwrap(), 0);
        assert_eq!(engine.report().unwrap().total_requests, 0);

        // the next attempt still goes to the backend
        assert_eq!(ask(&engine, "hello").await.kind, None);
    }

    #[tokio::test]
    async fn test_backend_timeout_caches_nothing() {
        let engine = engine_with(
            MockEmbeddingProvider::new(DIM),
            CacheConfig::new()
                .with_embedding_dimension(DIM)
                .with_backend_timeout(Duration::from_secs(1)),
        );
        let backend = MockAnswerBackend::new().with_delay(Duration::from_secs(5));

        tokio::time::pause();
        let result = engine.handle("hello", || backend.answer("hello")).await;

        assert!(matches!(result, Err(DomainError::Timeout { .. })));
        assert_eq!(engine.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_analytics_match_scripted_sequence() {
        let engine = engine();

        ask(&engine, "a").await;
        ask(&engine, "b").await;
        ask(&engine, "a").await;
        ask(&engine, "A").await;
        ask(&engine, " b ").await;

        let report = engine.report().unwrap();

        assert_eq!(report.total_requests, 5);
        assert_eq!(report.cache_hits, 3);
        assert_eq!(report.cache_misses, 2);
        assert_eq!(report.hit_rate, 0.6);
        // 3 hits * 3000 tokens at $10 per million
        assert!((report.cost_savings - 0.09).abs() < 1e-9);
        assert_eq!(report.savings_percent, 60);
    }

    #[tokio::test]
    async fn test_reset_clears_store_and_counters() {
        let engine = engine();

        ask(&engine, "a").await;
        ask(&engine, "a").await;

        engine.reset().unwrap();

        let stats = engine.stats().unwrap();
        assert_eq!(stats.cache_size, 0);
        assert_eq!(stats.report, AnalyticsReport::default());
        assert_eq!(ask(&engine, "a").await.kind, None);
    }

    #[tokio::test]
    async fn test_reset_during_inflight_miss_leaves_new_generation_empty() {
        let engine = Arc::new(engine());
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let inflight = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine
                    .handle("slow query", || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok("late answer".to_string())
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        engine.reset().unwrap();
        release_tx.send(()).unwrap();

        let outcome = inflight.await.unwrap().unwrap();
        assert_eq!(outcome.answer, "late answer");

        let stats = engine.stats().unwrap();
        assert_eq!(stats.cache_size, 0);
        assert_eq!(stats.report.total_requests, 0);
    }

    #[tokio::test]
    async fn test_reset_detaches_previous_generation() {
        let engine = engine();
        let before = engine.current().unwrap();
        assert!(engine.is_current(&before).unwrap());

        engine.reset().unwrap();

        assert!(!engine.is_current(&before).unwrap());
        let after = engine.current().unwrap();
        assert!(engine.is_current(&after).unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_identical_misses_create_one_entry() {
        let engine = Arc::new(engine());
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    engine
                        .handle("Same Question", || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok("shared answer".to_string())
                        })
                        .await
                })
            })
            .collect();

        let outcomes: Vec<CacheOutcome> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.len().unwrap(), 1);
        assert!(outcomes.iter().all(|o| o.answer == "shared answer"));
        assert_eq!(outcomes.iter().filter(|o| !o.is_cached()).count(), 1);

        let generation = engine.current().unwrap();
        assert!(generation.inflight.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_entries() {
        let clock = Arc::new(ManualClock::new());
        let engine = engine_with(
            MockEmbeddingProvider::new(DIM),
            CacheConfig::new()
                .with_embedding_dimension(DIM)
                .with_ttl(Duration::from_secs(1)),
        )
        .with_clock(clock.clone());

        ask(&engine, "a").await;
        ask(&engine, "b").await;
        clock.advance(Duration::from_secs(2));

        assert_eq!(engine.sweep_expired().unwrap(), 2);
        assert!(engine.is_empty().unwrap());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let result = CacheEngine::new(
            CacheConfig::new().with_embedding_dimension(8),
            AnalyticsConfig::default(),
            Arc::new(MockEmbeddingProvider::new(4)),
        );

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
