//! Query result caching
//!
//! This module provides the caching capability consumed by the execution
//! engine:
//!
//! - [`InMemoryCache`]: TTL cache with capacity eviction and a background
//!   sweep
//! - [`NoOpCache`]: disables caching entirely (the engine's default)
//!
//! Both satisfy the same [`QueryCache`] capability set, so the engine is
//! agnostic to which is installed. The invalidation layer in
//! [`invalidation`] is built on top of the capability set, not part of it.
//!
//! # Examples
//!
//! ```rust,ignore
//! use evmql::cache::{InMemoryCache, NoOpCache};
//! use evmql::config::CacheConfig;
//! use std::sync::Arc;
//!
//! // Active cache with TTL, capacity, and a 10 minute sweep
//! let cache = Arc::new(InMemoryCache::new(CacheConfig::default()));
//! let executor = Executor::new(chain, config).with_cache(cache);
//!
//! // Caching disabled
//! let executor = Executor::new(chain, config).with_cache(Arc::new(NoOpCache));
//! ```

use std::fmt;
use std::time::Duration;

use alloy_primitives::{hex, keccak256, Address};
use async_trait::async_trait;
use serde::Serialize;

use crate::query::{QueryMethod, QueryResult};

pub mod invalidation;
mod memory;
mod noop;

pub use invalidation::CacheInvalidator;
pub use memory::InMemoryCache;
pub use noop::NoOpCache;

/// Statistics about cache behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits (successful retrievals).
    pub hits: u64,
    /// Number of cache misses (key absent or expired).
    pub misses: u64,
    /// Number of entries evicted to enforce the capacity bound.
    pub evictions: u64,
    /// Number of entries removed because their TTL elapsed.
    pub expirations: u64,
    /// Current number of entries in the cache.
    pub entries: usize,
}

impl CacheStats {
    /// Cache hit rate as a percentage (0.0 to 100.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={}, misses={}, evictions={}, expirations={}, entries={}, hit_rate={:.1}%",
            self.hits,
            self.misses,
            self.evictions,
            self.expirations,
            self.entries,
            self.hit_rate()
        )
    }
}

/// Capability set for query result caches.
///
/// Implementations must be thread-safe; the engine shares one instance
/// across all concurrent queries for the process lifetime.
///
/// A zero `ttl` passed to [`set`](QueryCache::set) means "use the
/// configured default TTL"; the no-op variant ignores it entirely.
#[async_trait]
pub trait QueryCache: Send + Sync {
    /// Retrieves a cached result, or `None` if the key is absent or the
    /// entry has logically expired.
    async fn get(&self, key: &str) -> Option<QueryResult>;

    /// Inserts or replaces a result under `key`.
    async fn set(&self, key: String, value: QueryResult, ttl: Duration);

    /// Removes a single entry; returns whether it was present.
    async fn delete(&self, key: &str) -> bool;

    /// Removes every entry.
    async fn clear(&self);

    /// Current number of entries.
    async fn size(&self) -> usize;

    /// All current keys, in no particular order.
    async fn keys(&self) -> Vec<String>;

    /// Counters describing cache behavior so far.
    async fn stats(&self) -> CacheStats;

    /// Human-readable backend name, for logging.
    fn name(&self) -> &'static str;
}

/// Builds a cache key from a prefix, an address, and remaining parameters.
///
/// The key shape is `<prefix>:<0xaddress>:<digest>` where the digest is
/// the keccak256 of the JSON-encoded parameters. Identical logical queries
/// therefore collide on cache identity, while the readable prefix and
/// address segments make prefix- and address-scoped invalidation a plain
/// string-prefix match.
pub fn generate_key<P: Serialize>(prefix: &str, address: &Address, params: &P) -> String {
    let encoded = serde_json::to_vec(params).unwrap_or_default();
    let digest = keccak256(&encoded);
    format!(
        "{prefix}:0x{}:{}",
        hex::encode(address),
        hex::encode(digest)
    )
}

/// Key for a balance lookup at a block, or at the latest block.
pub fn balance_key(address: &Address, block: Option<u64>) -> String {
    let label = block.map_or_else(|| "latest".to_string(), |b| b.to_string());
    generate_key(QueryMethod::Balance.cache_prefix(), address, &[label])
}

/// Key for a ranged log fetch.
pub fn logs_key(address: &Address, from_block: u64, to_block: u64) -> String {
    generate_key(QueryMethod::Logs.cache_prefix(), address, &[from_block, to_block])
}

/// Key for a transaction range scan.
pub fn transactions_key(address: &Address, from_block: u64, to_block: u64) -> String {
    generate_key(
        QueryMethod::Transactions.cache_prefix(),
        address,
        &[from_block, to_block],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const ADDR: Address = address!("742d35cc6634c0532925a3b844bc454e4438f44e");

    #[test]
    fn test_identical_parameters_collide() {
        assert_eq!(logs_key(&ADDR, 100, 200), logs_key(&ADDR, 100, 200));
        assert_eq!(balance_key(&ADDR, None), balance_key(&ADDR, None));
    }

    #[test]
    fn test_distinct_parameters_diverge() {
        assert_ne!(logs_key(&ADDR, 100, 200), logs_key(&ADDR, 100, 201));
        assert_ne!(balance_key(&ADDR, None), balance_key(&ADDR, Some(100)));
        assert_ne!(
            logs_key(&ADDR, 100, 200),
            transactions_key(&ADDR, 100, 200)
        );
    }

    #[test]
    fn test_key_is_address_prefixed() {
        let key = balance_key(&ADDR, Some(5));
        assert!(key.starts_with("balance:0x742d35cc6634c0532925a3b844bc454e4438f44e:"));
    }
}
