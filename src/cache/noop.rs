//! No-operation cache that disables caching entirely

use std::time::Duration;

use async_trait::async_trait;

use super::{CacheStats, QueryCache};
use crate::query::QueryResult;

/// A cache that never stores anything.
///
/// Every read misses and every write is ignored. Installed by default so
/// the execution engine works without caching until an active cache is
/// injected.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCache;

#[async_trait]
impl QueryCache for NoOpCache {
    async fn get(&self, _key: &str) -> Option<QueryResult> {
        None
    }

    async fn set(&self, _key: String, _value: QueryResult, _ttl: Duration) {}

    async fn delete(&self, _key: &str) -> bool {
        false
    }

    async fn clear(&self) {}

    async fn size(&self) -> usize {
        0
    }

    async fn keys(&self) -> Vec<String> {
        Vec::new()
    }

    async fn stats(&self) -> CacheStats {
        CacheStats::default()
    }

    fn name(&self) -> &'static str {
        "NoOpCache"
    }
}
