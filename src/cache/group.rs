//! Cache Group Module
//!
//! A Group is a named cache namespace: one byte-bounded store, one loader,
//! one single-flight tracker and one miss queue. Groups are created once
//! at startup and live for the process lifetime.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::cache::{snapshot, ByteStore, ByteView, Flight, GroupStats, MissQueue, StatCounters};
use crate::error::{CacheError, Result};
use crate::loader::Loader;

// == Defaults ==
/// Miss queue capacity in the reference deployment.
pub const DEFAULT_MISS_CAPACITY: usize = 5000;

/// Age in minutes past which an entry is published to the miss queue.
pub const DEFAULT_EXPIRE_MINUTES: u64 = 30;

/// Delay between consecutive upstream refetches during a refresh pass.
pub const DEFAULT_REFRESH_PACING: Duration = Duration::from_millis(100);

// == Group Settings ==
/// Tunables fixed at group construction.
#[derive(Debug, Clone)]
pub struct GroupSettings {
    /// Byte budget for the store; 0 disables eviction
    pub max_bytes: u64,
    /// Miss queue capacity
    pub miss_capacity: usize,
    /// Expiry threshold for timeout-to-miss publication
    pub expire_minutes: u64,
    /// Inter-request delay while refreshing stale entries
    pub refresh_pacing: Duration,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            max_bytes: 1 << 27,
            miss_capacity: DEFAULT_MISS_CAPACITY,
            expire_minutes: DEFAULT_EXPIRE_MINUTES,
            refresh_pacing: DEFAULT_REFRESH_PACING,
        }
    }
}

// == Group ==
/// A named cache namespace with a coalescing load path.
pub struct Group {
    name: String,
    store: ByteStore,
    loader: Arc<dyn Loader>,
    flight: Flight,
    missed: MissQueue,
    stats: Arc<StatCounters>,
    expire_minutes: u64,
    refresh_pacing: Duration,
}

impl Group {
    // == Constructor ==
    pub fn new(name: impl Into<String>, loader: Arc<dyn Loader>, settings: GroupSettings) -> Self {
        let stats = Arc::new(StatCounters::new());
        let eviction_stats = stats.clone();
        let store = ByteStore::with_eviction_hook(
            settings.max_bytes,
            Box::new(move |_key, _value| eviction_stats.record_eviction()),
        );

        Self {
            name: name.into(),
            store,
            loader,
            flight: Flight::new(),
            missed: MissQueue::new(settings.miss_capacity),
            stats,
            expire_minutes: settings.expire_minutes,
            refresh_pacing: settings.refresh_pacing,
        }
    }

    // == Name ==
    pub fn name(&self) -> &str {
        &self.name
    }

    // == Get ==
    /// Returns the cached value for `key`, loading it from upstream on a
    /// miss. Concurrent misses for the same key share one loader run.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }

        if let Some(view) = self.store.get(key) {
            self.stats.record_hit();
            debug!(group = %self.name, key, "cache hit");
            return Ok(view);
        }

        self.stats.record_miss();
        debug!(group = %self.name, key, "cache miss");
        self.load(key).await
    }

    // == Load ==
    /// Coalesced load: at most one upstream fetch per key is in flight at
    /// any moment, and every waiter of a wave observes its outcome.
    async fn load(&self, key: &str) -> Result<ByteView> {
        self.flight.run(key, || self.get_locally(key)).await
    }

    // == Get Locally ==
    /// Runs the loader. On success the result is stored with a fresh
    /// timestamp; on failure the key is published to the miss queue so a
    /// peer can resolve it out of band.
    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        match self.loader.load(key).await {
            Ok(bytes) => {
                let view = ByteView::new(bytes);
                self.store.add(key, view.clone());
                self.stats.record_load();
                Ok(view)
            }
            Err(cause) => {
                self.stats.record_load_failure();
                if !self.missed.try_push(key) {
                    debug!(group = %self.name, key, "miss queue full, key dropped");
                }
                Err(load_error(cause))
            }
        }
    }

    // == Populate ==
    /// Administrative write path: stores a value directly, bypassing the
    /// loader and the flight tracker. Used when a peer supplies a resolved
    /// value.
    pub fn populate(&self, key: &str, value: ByteView) {
        self.store.add(key, value);
    }

    // == Pop Missed ==
    /// Hands out at most one unresolved key, non-blockingly.
    pub fn pop_missed(&self) -> Option<String> {
        self.missed.try_pop()
    }

    // == Refresh Stale ==
    /// Re-fetches up to `batch` of the oldest entries aged at least
    /// `min_age_minutes`, pacing requests to respect upstream rate limits.
    /// Keys whose refetch fails keep their stale value. The store lock is
    /// held only for the selection; every fetch happens outside it.
    /// Returns the number of entries refreshed.
    pub async fn refresh_stale(&self, batch: usize, min_age_minutes: u64) -> usize {
        let keys = self
            .store
            .oldest_matching(batch, |e| e.age_minutes() >= min_age_minutes);

        let mut refreshed = 0;
        for key in &keys {
            tokio::time::sleep(self.refresh_pacing).await;
            match self.loader.load(key).await {
                Ok(bytes) => {
                    self.store.add(key, ByteView::new(bytes));
                    self.stats.record_load();
                    refreshed += 1;
                }
                Err(err) => {
                    self.stats.record_load_failure();
                    warn!(group = %self.name, key, error = %err, "refresh failed, keeping stale value");
                }
            }
        }

        info!(
            group = %self.name,
            selected = keys.len(),
            refreshed,
            "stale refresh pass done"
        );
        refreshed
    }

    // == Publish Expired ==
    /// Pushes up to `batch` of the oldest entries past the group's expiry
    /// threshold onto the miss queue for peer resolution. Entries stay in
    /// the store; the stale value keeps serving reads until replaced.
    /// Returns the number of keys enqueued.
    pub fn publish_expired(&self, batch: usize) -> usize {
        let expire_minutes = self.expire_minutes;
        let keys = self
            .store
            .oldest_matching(batch, |e| e.age_minutes() >= expire_minutes);

        let mut queued = 0;
        for key in &keys {
            if self.missed.try_push(key) {
                queued += 1;
            }
        }

        info!(
            group = %self.name,
            selected = keys.len(),
            queued,
            "expired keys published to miss queue"
        );
        queued
    }

    // == Snapshot ==
    /// Saves the full key→value set to `path`. Best-effort; the caller
    /// logs and moves on when this fails.
    pub fn save_snapshot(&self, path: &Path) -> Result<usize> {
        snapshot::save(&self.store, path)
    }

    /// Restores a snapshot from `path`. A missing file is a cold start.
    pub fn load_snapshot(&self, path: &Path) -> Result<usize> {
        snapshot::load(&self.store, path)
    }

    // == Stats ==
    pub fn stats(&self) -> GroupStats {
        self.stats
            .snapshot(self.store.len(), self.store.used_bytes())
    }

    // == Test Support ==
    #[cfg(test)]
    pub(crate) fn store(&self) -> &ByteStore {
        &self.store
    }
}

// == Load Error Mapping ==
/// Transient transport trouble (refused connection, timed-out request)
/// surfaces as `UpstreamUnavailable`; everything else is a plain failed
/// load. Both reach the caller the same way.
fn load_error(cause: anyhow::Error) -> CacheError {
    match cause.downcast_ref::<reqwest::Error>() {
        Some(e) if e.is_connect() || e.is_timeout() => {
            CacheError::UpstreamUnavailable(cause.to_string())
        }
        _ => CacheError::LoadFailed(cause.to_string()),
    }
}

// == Group Registry ==
/// Name → group map owned by the composition root. Registration is
/// append-only and rare; lookups dominate, hence the read-write lock.
#[derive(Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a group under its name, returning the shared handle.
    pub fn register(&self, group: Group) -> Arc<Group> {
        let group = Arc::new(group);
        self.groups
            .write()
            .insert(group.name().to_string(), group.clone());
        group
    }

    /// Looks up a previously registered group.
    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoaderFn;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts loader invocations; keys starting with "missing" fail.
    struct CountingLoader {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl CountingLoader {
        fn new(delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Loader for CountingLoader {
        async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if key.starts_with("missing") {
                anyhow::bail!("no data");
            }
            Ok(format!("loaded:{}", key).into_bytes())
        }
    }

    fn test_settings() -> GroupSettings {
        GroupSettings {
            max_bytes: 0,
            miss_capacity: 16,
            expire_minutes: 30,
            refresh_pacing: Duration::ZERO,
        }
    }

    fn test_group(loader: Arc<CountingLoader>) -> Group {
        Group::new("test", loader, test_settings())
    }

    #[tokio::test]
    async fn test_get_empty_key_is_invalid() {
        let group = test_group(Arc::new(CountingLoader::new(Duration::ZERO)));
        assert_eq!(group.get("").await, Err(CacheError::InvalidKey));
    }

    #[tokio::test]
    async fn test_get_loads_on_miss_then_hits() {
        let loader = Arc::new(CountingLoader::new(Duration::ZERO));
        let group = test_group(loader.clone());

        let first = group.get("key").await.expect("load");
        assert_eq!(first, ByteView::from("loaded:key"));
        assert_eq!(loader.calls(), 1);

        let second = group.get("key").await.expect("hit");
        assert_eq!(second, first);
        assert_eq!(loader.calls(), 1);

        let stats = group.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.loads, 1);
    }

    #[tokio::test]
    async fn test_concurrent_gets_trigger_one_load() {
        let loader = Arc::new(CountingLoader::new(Duration::from_millis(50)));
        let group = Arc::new(test_group(loader.clone()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let group = group.clone();
            handles.push(tokio::spawn(async move { group.get("hot").await }));
        }

        let mut values = HashSet::new();
        for handle in handles {
            let view = handle.await.expect("task").expect("value");
            values.insert(view.to_string_lossy());
        }

        assert_eq!(loader.calls(), 1);
        assert_eq!(values.len(), 1);
        assert!(values.contains("loaded:hot"));
    }

    #[tokio::test]
    async fn test_failed_load_seeds_miss_queue() {
        let loader = Arc::new(CountingLoader::new(Duration::ZERO));
        let group = test_group(loader.clone());

        let err = group.get("missing-key").await.expect_err("should fail");
        assert!(matches!(err, CacheError::LoadFailed(_)));
        assert_eq!(group.pop_missed(), Some("missing-key".to_string()));
        assert_eq!(group.pop_missed(), None);
        assert_eq!(group.stats().load_failures, 1);
    }

    #[tokio::test]
    async fn test_concurrent_failures_share_one_error() {
        let loader = Arc::new(CountingLoader::new(Duration::from_millis(30)));
        let group = Arc::new(test_group(loader.clone()));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let group = group.clone();
            handles.push(tokio::spawn(async move { group.get("missing-hot").await }));
        }
        for handle in handles {
            let outcome = handle.await.expect("task");
            assert!(matches!(outcome, Err(CacheError::LoadFailed(_))));
        }

        assert_eq!(loader.calls(), 1);
        // One wave pushes the key once
        assert_eq!(group.pop_missed(), Some("missing-hot".to_string()));
        assert_eq!(group.pop_missed(), None);
    }

    #[tokio::test]
    async fn test_populate_bypasses_loader() {
        let loader = Arc::new(CountingLoader::new(Duration::ZERO));
        let group = test_group(loader.clone());

        group.populate("seeded", ByteView::from("peer value"));
        let view = group.get("seeded").await.expect("hit");
        assert_eq!(view, ByteView::from("peer value"));
        assert_eq!(loader.calls(), 0);
    }

    #[tokio::test]
    async fn test_refresh_stale_repopulates_old_entries() {
        let loader = Arc::new(CountingLoader::new(Duration::ZERO));
        let group = test_group(loader.clone());

        group.populate("old", ByteView::from("stale"));
        group.populate("fresh", ByteView::from("fine"));
        group.store().backdate("old", Duration::from_secs(40 * 60));

        let refreshed = group.refresh_stale(10, 30).await;
        assert_eq!(refreshed, 1);
        assert_eq!(
            group.get("old").await.expect("hit"),
            ByteView::from("loaded:old")
        );
        assert_eq!(
            group.get("fresh").await.expect("hit"),
            ByteView::from("fine")
        );
    }

    #[tokio::test]
    async fn test_refresh_stale_keeps_value_on_failure() {
        let loader = Arc::new(CountingLoader::new(Duration::ZERO));
        let group = test_group(loader.clone());

        group.populate("missing-old", ByteView::from("stale but served"));
        group
            .store()
            .backdate("missing-old", Duration::from_secs(40 * 60));

        let refreshed = group.refresh_stale(10, 30).await;
        assert_eq!(refreshed, 0);
        // Stale value preferred over no value
        assert_eq!(
            group.get("missing-old").await.expect("hit"),
            ByteView::from("stale but served")
        );
    }

    #[tokio::test]
    async fn test_refresh_honors_batch_size() {
        let loader = Arc::new(CountingLoader::new(Duration::ZERO));
        let group = test_group(loader.clone());

        for i in 0..5 {
            let key = format!("k{}", i);
            group.populate(&key, ByteView::from("v"));
            group.store().backdate(&key, Duration::from_secs(60 * 60));
        }

        let refreshed = group.refresh_stale(2, 30).await;
        assert_eq!(refreshed, 2);
        assert_eq!(loader.calls(), 2);
    }

    #[tokio::test]
    async fn test_publish_expired_keeps_entries_serving() {
        let loader = Arc::new(CountingLoader::new(Duration::ZERO));
        let group = test_group(loader.clone());

        group.populate("expired", ByteView::from("stale"));
        group.populate("young", ByteView::from("fresh"));
        group
            .store()
            .backdate("expired", Duration::from_secs(45 * 60));

        let queued = group.publish_expired(10);
        assert_eq!(queued, 1);
        assert_eq!(group.pop_missed(), Some("expired".to_string()));

        // Still served from the store after publication
        assert_eq!(
            group.get("expired").await.expect("hit"),
            ByteView::from("stale")
        );
        assert_eq!(loader.calls(), 0);
    }

    #[tokio::test]
    async fn test_eviction_counted_in_stats() {
        let loader = Arc::new(CountingLoader::new(Duration::ZERO));
        let mut settings = test_settings();
        settings.max_bytes = 100;
        let group = Group::new("bounded", loader, settings);

        group.populate("a", ByteView::new(vec![0u8; 60]));
        group.populate("b", ByteView::new(vec![0u8; 60]));
        assert_eq!(group.stats().evictions, 1);
        assert_eq!(group.stats().entries, 1);
    }

    #[test]
    fn test_registry_register_and_get() {
        let registry = GroupRegistry::new();
        let loader = Arc::new(LoaderFn(|_: &str| Ok(Vec::new())));
        registry.register(Group::new("quotes", loader, GroupSettings::default()));

        assert!(registry.get("quotes").is_some());
        assert!(registry.get("unknown").is_none());
        assert_eq!(
            registry.get("quotes").map(|g| g.name().to_string()),
            Some("quotes".to_string())
        );
    }
}
