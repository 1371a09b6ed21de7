//! Configuration for query execution and caching
//!
//! Configuration is constructed explicitly and passed by value: there is
//! no process-wide default state. Loading and merging configuration files
//! is the hosting program's job; this module only defines the types.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use evmql::config::ExecutorConfig;
//!
//! let config = ExecutorConfig::default();
//! assert_eq!(config.max_workers(), 5);
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use evmql::config::{CacheConfig, ExecutorConfig};
//! use std::time::Duration;
//!
//! let config = ExecutorConfig::default()
//!     .with_query_timeout(Duration::from_secs(10))
//!     .with_max_workers(8)
//!     .with_default_tx_window(50);
//!
//! let cache_config = CacheConfig::default()
//!     .with_max_items(500)
//!     .with_default_ttl(Duration::from_secs(60));
//! ```

use std::time::Duration;

pub mod constants;

/// Configuration for the execution engine and range scanner.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Deadline attached to every query whose caller supplies none.
    pub query_timeout: Duration,

    /// Width of the block window used for `TRANSACTIONS` queries without
    /// an explicit `BLOCK` clause, ending at the chain head.
    pub default_tx_window: u64,

    max_workers: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(30),
            default_tx_window: 100,
            max_workers: 5,
        }
    }
}

impl ExecutorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default per-query deadline.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Sets the number of concurrent scan workers.
    ///
    /// Zero is ignored and the previous value is kept; the pool always
    /// has at least one worker.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        if max_workers > 0 {
            self.max_workers = max_workers;
        }
        self
    }

    /// Sets the default `TRANSACTIONS` window width in blocks.
    pub fn with_default_tx_window(mut self, blocks: u64) -> Self {
        self.default_tx_window = blocks;
        self
    }

    /// Number of concurrent scan workers.
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }
}

/// Configuration for the in-memory TTL cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries before eviction; zero means unbounded.
    pub max_items: usize,

    /// TTL substituted when `set` is called with a zero TTL.
    pub default_ttl: Duration,

    /// Interval between background sweeps of expired entries; zero
    /// disables the sweeper entirely.
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_items: 1_000,
            default_ttl: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(600),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entry capacity; zero means unbounded.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Sets the TTL used when `set` receives a zero TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Sets the background sweep interval; zero disables sweeping.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}
