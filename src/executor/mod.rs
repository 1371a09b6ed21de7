//! Query execution engine
//!
//! Routes a parsed [`Query`] to its retrieval strategy: point balance
//! fetch, ranged log fetch, or concurrent transaction scan. Consults the
//! installed cache before touching the chain and populates it after a
//! successful fetch. Enforces the per-method range caps and the result
//! size cap as defense-in-depth beyond the parser.
//!
//! # Examples
//!
//! ```rust,ignore
//! use evmql::{AlloyChainAccess, Executor, ExecutorConfig, InMemoryCache, Parser};
//! use std::sync::Arc;
//!
//! let chain = Arc::new(AlloyChainAccess::new(provider, rpc_url));
//! let executor = Executor::new(chain, ExecutorConfig::default())
//!     .with_cache(Arc::new(InMemoryCache::default()));
//!
//! let query = Parser::new().parse("SELECT BALANCE FROM 0x742d...f44e")?;
//! let result = executor.execute(&query).await?;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::cache::{balance_key, logs_key, transactions_key, NoOpCache, QueryCache};
use crate::chain::ChainAccess;
use crate::config::constants::{
    LOGS_MAX_BLOCK_SPAN, MAX_RESULT_SIZE, TRANSACTIONS_MAX_BLOCK_SPAN,
};
use crate::config::ExecutorConfig;
use crate::errors::{ExecutionError, RpcError};
use crate::query::{Query, QueryMethod, QueryResult};

pub mod scanner;

pub use scanner::RangeScanner;

/// Executes parsed queries against one chain-access endpoint.
///
/// Constructed once and shared; the cache and the endpoint are injected
/// explicitly rather than held in process-wide state.
pub struct Executor<C> {
    chain: Arc<C>,
    cache: Arc<dyn QueryCache>,
    config: ExecutorConfig,
}

impl<C: ChainAccess + 'static> Executor<C> {
    /// Creates an executor with caching disabled.
    pub fn new(chain: Arc<C>, config: ExecutorConfig) -> Self {
        Self {
            chain,
            cache: Arc::new(NoOpCache),
            config,
        }
    }

    /// Installs a cache implementation.
    pub fn with_cache(mut self, cache: Arc<dyn QueryCache>) -> Self {
        self.cache = cache;
        self
    }

    /// The installed cache, for operator actions such as invalidation.
    pub fn cache(&self) -> Arc<dyn QueryCache> {
        Arc::clone(&self.cache)
    }

    /// Executes a query under the configured default deadline.
    pub async fn execute(&self, query: &Query) -> Result<QueryResult, ExecutionError> {
        self.execute_with_cancellation(query, &CancellationToken::new())
            .await
    }

    /// Executes a query under a caller-supplied cancellation token.
    ///
    /// A child token carrying the configured default deadline governs
    /// every downstream call; cancelling `cancel` cancels the query. The
    /// derived token is released on every exit path.
    pub async fn execute_with_cancellation(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<QueryResult, ExecutionError> {
        let deadline = cancel.child_token();
        let timer = tokio::spawn({
            let deadline = deadline.clone();
            let timeout = self.config.query_timeout;
            async move {
                tokio::time::sleep(timeout).await;
                deadline.cancel();
            }
        });
        let _release = deadline.clone().drop_guard();

        info!(
            method = %query.method(),
            address = %query.address(),
            from_block = ?query.from_block(),
            to_block = ?query.to_block(),
            "executing query"
        );
        let started = Instant::now();

        let result = match query.method() {
            QueryMethod::Balance => self.get_balance(query, &deadline).await,
            QueryMethod::Logs => self.get_logs(query, &deadline).await,
            QueryMethod::Transactions => self.get_transactions(query, &deadline).await,
        };
        timer.abort();

        match &result {
            Ok(value) => info!(
                method = %query.method(),
                items = value.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "query execution completed"
            ),
            Err(e) => error!(
                method = %query.method(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %e,
                "query execution failed"
            ),
        }

        result
    }

    async fn get_balance(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<QueryResult, ExecutionError> {
        let key = balance_key(&query.address(), query.from_block());

        if let Some(cached) = self.cache.get(&key).await {
            if matches!(cached, QueryResult::Balance(_)) {
                return Ok(cached);
            }
        }

        let balance = race(
            cancel,
            self.chain.balance_at(query.address(), query.from_block()),
        )
        .await?;

        let result = QueryResult::Balance(balance);
        self.cache.set(key.clone(), result.clone(), Duration::ZERO).await;
        debug!(key = %key, "cached balance");

        Ok(result)
    }

    async fn get_logs(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<QueryResult, ExecutionError> {
        // Syntactically valid without BLOCK, but invalid for this method
        let (from_block, to_block) = match (query.from_block(), query.to_block()) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                return Err(ExecutionError::MissingRange {
                    method: QueryMethod::Logs,
                })
            }
        };

        let span = to_block.saturating_sub(from_block);
        if span > LOGS_MAX_BLOCK_SPAN {
            return Err(ExecutionError::RangeTooLarge {
                method: QueryMethod::Logs,
                span,
                max: LOGS_MAX_BLOCK_SPAN,
            });
        }

        let key = logs_key(&query.address(), from_block, to_block);

        if let Some(cached) = self.cache.get(&key).await {
            if matches!(cached, QueryResult::Logs(_)) {
                return Ok(cached);
            }
        }

        let logs = race(
            cancel,
            self.chain.filter_logs(query.address(), from_block, to_block),
        )
        .await?;

        // Oversized results are rejected and deliberately not cached
        if logs.len() > MAX_RESULT_SIZE {
            return Err(ExecutionError::ResultTooLarge {
                count: logs.len(),
                max: MAX_RESULT_SIZE,
            });
        }

        let result = QueryResult::Logs(logs);
        self.cache.set(key.clone(), result.clone(), Duration::ZERO).await;
        debug!(key = %key, items = result.len(), "cached logs");

        Ok(result)
    }

    async fn get_transactions(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<QueryResult, ExecutionError> {
        let (from_block, to_block) = match (query.from_block(), query.to_block()) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                // No explicit range: scan a default window ending at the head
                let head = race(cancel, self.chain.current_block_number()).await?;
                (head.saturating_sub(self.config.default_tx_window), head)
            }
        };

        let span = to_block.saturating_sub(from_block);
        if span > TRANSACTIONS_MAX_BLOCK_SPAN {
            return Err(ExecutionError::RangeTooLarge {
                method: QueryMethod::Transactions,
                span,
                max: TRANSACTIONS_MAX_BLOCK_SPAN,
            });
        }

        let key = transactions_key(&query.address(), from_block, to_block);

        if let Some(cached) = self.cache.get(&key).await {
            if matches!(cached, QueryResult::Transactions(_)) {
                return Ok(cached);
            }
        }

        let scanner = RangeScanner::new(Arc::clone(&self.chain), self.config.max_workers());
        let transactions = scanner
            .scan(query.address(), from_block, to_block, cancel)
            .await?;

        let result = QueryResult::Transactions(transactions);
        self.cache.set(key.clone(), result.clone(), Duration::ZERO).await;
        debug!(key = %key, items = result.len(), "cached transactions");

        Ok(result)
    }
}

/// Races a chain-access call against cancellation.
async fn race<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, RpcError>>,
) -> Result<T, ExecutionError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(ExecutionError::Cancelled { gathered: 0 }),
        result = fut => Ok(result?),
    }
}
