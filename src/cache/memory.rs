// SPDX-FileCopyrightText: 2026 EVMQL Contributors
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory cache with TTL, capacity eviction, and a background sweep

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use super::{CacheStats, QueryCache};
use crate::config::CacheConfig;
use crate::query::QueryResult;

/// A cached value with its absolute expiration time.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: QueryResult,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

struct CacheInner {
    /// The entry map; the single lock shared by foreground operations and
    /// the sweep. Reads take the shared lock, every mutation the
    /// exclusive one.
    entries: RwLock<HashMap<String, CacheEntry>>,
    config: CacheConfig,
    // Stats are atomics so the read path never needs the exclusive lock
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

/// In-memory TTL cache.
///
/// Semantics:
///
/// - every entry carries an absolute expiration time; a zero TTL on
///   [`set`](QueryCache::set) substitutes the configured default
/// - expiry is logical: a read past the expiration returns `None` even if
///   the sweeper has not run yet
/// - at capacity, exactly one entry is evicted per insert: the one with
///   the nearest expiration (expiry-order, not LRU)
/// - a background sweep prunes expired entries at the configured
///   interval; a zero interval disables it. The sweeper holds only a weak
///   reference and terminates once the cache is dropped.
///
/// # Examples
///
/// ```rust,ignore
/// use evmql::cache::InMemoryCache;
/// use evmql::config::CacheConfig;
/// use std::time::Duration;
///
/// let cache = InMemoryCache::new(
///     CacheConfig::new()
///         .with_max_items(500)
///         .with_default_ttl(Duration::from_secs(300))
///         .with_sweep_interval(Duration::from_secs(600)),
/// );
/// ```
pub struct InMemoryCache {
    inner: Arc<CacheInner>,
}

impl InMemoryCache {
    /// Creates a cache and, unless the interval is zero, spawns its sweeper.
    ///
    /// Must be called from within a tokio runtime when sweeping is enabled.
    pub fn new(config: CacheConfig) -> Self {
        let sweep_interval = config.sweep_interval;
        let inner = Arc::new(CacheInner {
            entries: RwLock::new(HashMap::new()),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        });

        if !sweep_interval.is_zero() {
            Self::spawn_sweeper(Arc::downgrade(&inner), sweep_interval);
        }

        Self { inner }
    }

    fn spawn_sweeper(inner: Weak<CacheInner>, interval: Duration) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so a fresh cache
            // is not swept before anything is inserted
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = inner.upgrade() else {
                    break;
                };
                cache.sweep().await;
            }
        });
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl CacheInner {
    /// Removes every expired entry under the exclusive lock.
    async fn sweep(&self) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();
        if removed > 0 {
            self.expirations.fetch_add(removed as u64, Ordering::Relaxed);
            debug!(removed, remaining = entries.len(), "swept expired cache entries");
        }
    }

    /// Evicts the entry with the nearest expiration time.
    fn evict_nearest_expiry(entries: &mut HashMap<String, CacheEntry>) -> Option<String> {
        let victim = entries
            .iter()
            .min_by_key(|(_, entry)| entry.expires_at)
            .map(|(key, _)| key.clone())?;
        entries.remove(&victim);
        Some(victim)
    }
}

#[async_trait::async_trait]
impl QueryCache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<QueryResult> {
        let entries = self.inner.entries.read().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key, "cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                // Expired but not yet swept; logically absent. Removal is
                // left to the sweeper so reads stay on the shared lock.
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key, "cache entry expired");
                None
            }
            None => {
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key, "cache miss");
                None
            }
        }
    }

    async fn set(&self, key: String, value: QueryResult, ttl: Duration) {
        let ttl = if ttl.is_zero() {
            self.inner.config.default_ttl
        } else {
            ttl
        };

        let mut entries = self.inner.entries.write().await;

        let max_items = self.inner.config.max_items;
        if max_items > 0 && entries.len() >= max_items && !entries.contains_key(&key) {
            if let Some(victim) = CacheInner::evict_nearest_expiry(&mut entries) {
                self.inner.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(key = %victim, "evicted nearest-expiry cache entry");
            }
        }

        debug!(key = %key, ttl_secs = ttl.as_secs(), "caching entry");
        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn delete(&self, key: &str) -> bool {
        let mut entries = self.inner.entries.write().await;
        entries.remove(key).is_some()
    }

    async fn clear(&self) {
        let mut entries = self.inner.entries.write().await;
        debug!(entries = entries.len(), "clearing cache");
        entries.clear();
    }

    async fn size(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    async fn keys(&self) -> Vec<String> {
        self.inner.entries.read().await.keys().cloned().collect()
    }

    async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            evictions: self.inner.evictions.load(Ordering::Relaxed),
            expirations: self.inner.expirations.load(Ordering::Relaxed),
            entries: self.inner.entries.read().await.len(),
        }
    }

    fn name(&self) -> &'static str {
        "InMemoryCache"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    fn balance(n: u64) -> QueryResult {
        QueryResult::Balance(U256::from(n))
    }

    fn test_config() -> CacheConfig {
        // No sweeper: tests exercise logical expiry directly
        CacheConfig::new()
            .with_default_ttl(Duration::from_secs(60))
            .with_sweep_interval(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_set_then_get_within_ttl() {
        let cache = InMemoryCache::new(test_config());

        cache
            .set("k".to_string(), balance(42), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get("k").await, Some(balance(42)));

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_get_after_ttl_expires() {
        let cache = InMemoryCache::new(test_config());

        cache
            .set("k".to_string(), balance(1), Duration::from_millis(20))
            .await;
        assert!(cache.get("k").await.is_some());

        tokio::time::sleep(Duration::from_millis(40)).await;

        // Logical expiry at read time, no sweeper involved
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_zero_ttl_uses_default() {
        let cache = InMemoryCache::new(
            test_config().with_default_ttl(Duration::from_millis(20)),
        );

        cache.set("k".to_string(), balance(1), Duration::ZERO).await;
        assert!(cache.get("k").await.is_some());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_capacity_never_exceeded() {
        let cache = InMemoryCache::new(test_config().with_max_items(3));

        for i in 0..10u64 {
            cache
                .set(format!("k{i}"), balance(i), Duration::from_secs(60))
                .await;
            assert!(cache.size().await <= 3);
        }
        assert_eq!(cache.size().await, 3);
        assert_eq!(cache.stats().await.evictions, 7);
    }

    #[tokio::test]
    async fn test_eviction_removes_nearest_expiry() {
        let cache = InMemoryCache::new(test_config().with_max_items(2));

        cache
            .set("long".to_string(), balance(1), Duration::from_secs(600))
            .await;
        cache
            .set("short".to_string(), balance(2), Duration::from_secs(5))
            .await;

        // At capacity: the entry expiring soonest goes first
        cache
            .set("new".to_string(), balance(3), Duration::from_secs(60))
            .await;

        assert!(cache.get("short").await.is_none());
        assert!(cache.get("long").await.is_some());
        assert!(cache.get("new").await.is_some());
    }

    #[tokio::test]
    async fn test_overwrite_at_capacity_does_not_evict() {
        let cache = InMemoryCache::new(test_config().with_max_items(2));

        cache
            .set("a".to_string(), balance(1), Duration::from_secs(60))
            .await;
        cache
            .set("b".to_string(), balance(2), Duration::from_secs(60))
            .await;

        // Overwriting an existing key replaces in place
        cache
            .set("a".to_string(), balance(3), Duration::from_secs(60))
            .await;

        assert_eq!(cache.size().await, 2);
        assert_eq!(cache.get("a").await, Some(balance(3)));
        assert_eq!(cache.stats().await.evictions, 0);
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let cache = InMemoryCache::new(test_config());

        cache.set("a".to_string(), balance(1), Duration::ZERO).await;
        cache.set("b".to_string(), balance(2), Duration::ZERO).await;

        assert!(cache.delete("a").await);
        assert!(!cache.delete("a").await);
        assert_eq!(cache.size().await, 1);

        cache.clear().await;
        assert_eq!(cache.size().await, 0);
        assert!(cache.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_background_sweep_prunes_expired() {
        let cache = InMemoryCache::new(
            CacheConfig::new()
                .with_default_ttl(Duration::from_millis(10))
                .with_sweep_interval(Duration::from_millis(25)),
        );

        cache.set("k".to_string(), balance(1), Duration::ZERO).await;
        assert_eq!(cache.size().await, 1);

        tokio::time::sleep(Duration::from_millis(80)).await;

        // The sweeper physically removed the entry, not just logically
        assert_eq!(cache.size().await, 0);
        assert!(cache.stats().await.expirations >= 1);
    }

    #[tokio::test]
    async fn test_keys_lists_current_entries() {
        let cache = InMemoryCache::new(test_config());

        cache.set("x".to_string(), balance(1), Duration::ZERO).await;
        cache.set("y".to_string(), balance(2), Duration::ZERO).await;

        let mut keys = cache.keys().await;
        keys.sort();
        assert_eq!(keys, vec!["x".to_string(), "y".to_string()]);
    }
}
