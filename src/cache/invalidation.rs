//! Pattern-based cache invalidation
//!
//! Built on top of the [`QueryCache`] capability set, not part of it.
//! Invalidation is an explicit operator action; nothing in the system
//! invalidates automatically on write, since all cached data is
//! externally sourced.

use std::sync::Arc;

use alloy_primitives::{hex, Address};
use tracing::info;

use super::QueryCache;
use crate::query::QueryMethod;

/// Deletes every entry whose key starts with `prefix`.
///
/// Returns the number of entries removed.
pub async fn invalidate_by_prefix(cache: &dyn QueryCache, prefix: &str) -> usize {
    let mut removed = 0;
    for key in cache.keys().await {
        if key.starts_with(prefix) && cache.delete(&key).await {
            removed += 1;
        }
    }
    if removed > 0 {
        info!(prefix, removed, "invalidated cache entries by prefix");
    }
    removed
}

/// Deletes every cached result for one address across all three methods.
///
/// Relies on the key shape `<method>:<0xaddress>:<digest>` produced by
/// [`generate_key`](super::generate_key).
pub async fn invalidate_by_address(cache: &dyn QueryCache, address: &Address) -> usize {
    let addr = format!("0x{}", hex::encode(address));
    let mut removed = 0;
    for method in [
        QueryMethod::Balance,
        QueryMethod::Logs,
        QueryMethod::Transactions,
    ] {
        let prefix = format!("{}:{addr}", method.cache_prefix());
        removed += invalidate_by_prefix(cache, &prefix).await;
    }
    removed
}

/// Operator facade over the invalidation helpers.
///
/// # Examples
///
/// ```rust,ignore
/// use evmql::cache::CacheInvalidator;
///
/// let invalidator = CacheInvalidator::new(cache.clone());
/// invalidator.invalidate_balances().await;
/// invalidator.invalidate_address(&address).await;
/// invalidator.invalidate_all().await;
/// ```
pub struct CacheInvalidator {
    cache: Arc<dyn QueryCache>,
}

impl CacheInvalidator {
    pub fn new(cache: Arc<dyn QueryCache>) -> Self {
        Self { cache }
    }

    /// Removes all cached balances.
    pub async fn invalidate_balances(&self) -> usize {
        invalidate_by_prefix(self.cache.as_ref(), "balance:").await
    }

    /// Removes all cached log results.
    pub async fn invalidate_logs(&self) -> usize {
        invalidate_by_prefix(self.cache.as_ref(), "logs:").await
    }

    /// Removes all cached transaction scans.
    pub async fn invalidate_transactions(&self) -> usize {
        invalidate_by_prefix(self.cache.as_ref(), "transactions:").await
    }

    /// Removes every cached result for one address.
    pub async fn invalidate_address(&self, address: &Address) -> usize {
        invalidate_by_address(self.cache.as_ref(), address).await
    }

    /// Clears the entire cache.
    pub async fn invalidate_all(&self) {
        info!("clearing entire cache");
        self.cache.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{balance_key, logs_key, transactions_key, InMemoryCache};
    use crate::config::CacheConfig;
    use crate::query::QueryResult;
    use alloy_primitives::{address, U256};
    use std::time::Duration;

    const ALICE: Address = address!("742d35cc6634c0532925a3b844bc454e4438f44e");
    const BOB: Address = address!("0000000000000000000000000000000000000001");

    fn value() -> QueryResult {
        QueryResult::Balance(U256::from(7u64))
    }

    async fn seeded_cache() -> InMemoryCache {
        let cache = InMemoryCache::new(CacheConfig::new().with_sweep_interval(Duration::ZERO));
        for addr in [ALICE, BOB] {
            cache.set(balance_key(&addr, None), value(), Duration::ZERO).await;
            cache
                .set(logs_key(&addr, 1, 100), value(), Duration::ZERO)
                .await;
            cache
                .set(transactions_key(&addr, 1, 100), value(), Duration::ZERO)
                .await;
        }
        cache
    }

    #[tokio::test]
    async fn test_invalidate_by_prefix() {
        let cache = seeded_cache().await;
        assert_eq!(cache.size().await, 6);

        let removed = invalidate_by_prefix(&cache, "balance:").await;
        assert_eq!(removed, 2);
        assert_eq!(cache.size().await, 4);
        assert!(cache.get(&balance_key(&ALICE, None)).await.is_none());
        assert!(cache.get(&logs_key(&ALICE, 1, 100)).await.is_some());
    }

    #[tokio::test]
    async fn test_invalidate_by_address_spares_other_addresses() {
        let cache = seeded_cache().await;

        let removed = invalidate_by_address(&cache, &ALICE).await;
        assert_eq!(removed, 3);
        assert_eq!(cache.size().await, 3);

        // Bob's entries are untouched
        assert!(cache.get(&balance_key(&BOB, None)).await.is_some());
        assert!(cache.get(&logs_key(&BOB, 1, 100)).await.is_some());
        assert!(cache.get(&transactions_key(&BOB, 1, 100)).await.is_some());
    }

    #[tokio::test]
    async fn test_invalidator_facade() {
        let cache = Arc::new(seeded_cache().await);
        let invalidator = CacheInvalidator::new(cache.clone());

        assert_eq!(invalidator.invalidate_logs().await, 2);
        assert_eq!(invalidator.invalidate_transactions().await, 2);
        assert_eq!(cache.size().await, 2);

        invalidator.invalidate_all().await;
        assert_eq!(cache.size().await, 0);
    }

    #[tokio::test]
    async fn test_invalidate_missing_prefix_is_noop() {
        let cache = seeded_cache().await;
        assert_eq!(invalidate_by_prefix(&cache, "storage:").await, 0);
        assert_eq!(cache.size().await, 6);
    }
}
