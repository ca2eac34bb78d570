//! Simulation cache collaborator.
//!
//! The orchestrator only needs `get` and `put`. Implementations own their
//! expiry policy; entries are immutable until they expire, so a second
//! `put` for a live key is ignored. Backends that keep expired rows around
//! are swept by [`spawn_purger`].

use async_trait::async_trait;
use ffdraft_domain::SimulationResponse;
use moka::Expiry;
use moka::sync::Cache;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Default lifetime of a cached response.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default capacity of the in-memory cache.
pub const DEFAULT_MAX_ENTRIES: u64 = 1_000;

/// Default period between sweeps of expired entries.
pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Cache failures. The orchestrator degrades on any of them.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// Backend unreachable or the operation failed.
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    /// Stored value could not be encoded or decoded.
    #[error("cache serialization failed: {0}")]
    Serialization(String),
}

/// Stores computed responses by cache key.
#[async_trait]
pub trait SimulationCache: Send + Sync {
    /// Returns the live entry for `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<SimulationResponse>, CacheError>;

    /// Stores `value` under `key` for `ttl`, unless a live entry exists.
    async fn put(
        &self,
        key: &str,
        value: &SimulationResponse,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Removes expired entries and returns how many went. Backends that
    /// evict on their own keep the default.
    async fn purge_expired(&self) -> Result<u64, CacheError> {
        Ok(0)
    }

    /// Short backend name for logs and health output.
    fn name(&self) -> &'static str;
}

/// Sweeps `cache` every `every` until the returned handle is aborted.
pub fn spawn_purger(cache: Arc<dyn SimulationCache>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match cache.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => debug!(backend = cache.name(), removed, "Purged expired cache entries"),
                Err(e) => warn!(backend = cache.name(), error = %e, "Cache purge failed"),
            }
        }
    })
}

#[derive(Clone)]
struct CachedEntry {
    response: Arc<SimulationResponse>,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, CachedEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache backed by `moka`, with a TTL per entry.
pub struct MemoryCache {
    cache: Cache<String, CachedEntry>,
}

impl MemoryCache {
    #[must_use]
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }

    /// Number of live entries (approximate until pending tasks run).
    #[must_use]
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies pending inserts and evictions so `len` is exact.
    pub fn run_pending(&self) {
        self.cache.run_pending_tasks();
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

#[async_trait]
impl SimulationCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<SimulationResponse>, CacheError> {
        Ok(self.cache.get(key).map(|entry| (*entry.response).clone()))
    }

    async fn put(
        &self,
        key: &str,
        value: &SimulationResponse,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.cache
            .entry(key.to_string())
            .or_insert_with(|| CachedEntry {
                response: Arc::new(value.clone()),
                ttl,
            });
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, CacheError> {
        let before = self.cache.entry_count();
        self.cache.run_pending_tasks();
        Ok(before.saturating_sub(self.cache.entry_count()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
