// SPDX-FileCopyrightText: 2026 EVMQL Contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Bounded-concurrency block range scanner
//!
//! Scans `[from_block, to_block]` with a fixed pool of workers, fetching
//! each block once and keeping the transactions that involve the target
//! address. Per-block fetches dominate latency, so the pool parallelizes
//! an inherently independent computation while the bounded queue caps the
//! load placed on the endpoint.
//!
//! Completion order is not block order: callers that need a stable order
//! must sort the aggregated result explicitly.

use std::sync::Arc;

use alloy_primitives::Address;
use futures::future::join_all;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::chain::ChainAccess;
use crate::config::constants::MAX_RESULT_SIZE;
use crate::errors::{ExecutionError, RpcError};
use crate::query::TxRecord;

/// Outcome of scanning a single block.
struct BlockOutcome {
    block_number: u64,
    result: Result<Vec<TxRecord>, RpcError>,
}

/// Fixed-size worker pool that scans a validated block range.
pub struct RangeScanner<C> {
    chain: Arc<C>,
    max_workers: usize,
}

impl<C: ChainAccess + 'static> RangeScanner<C> {
    /// Creates a scanner with `max_workers` concurrent workers (minimum 1).
    pub fn new(chain: Arc<C>, max_workers: usize) -> Self {
        Self {
            chain,
            max_workers: max_workers.max(1),
        }
    }

    /// Scans `[from_block, to_block]` for transactions involving `address`.
    ///
    /// A feeder enqueues every block number in increasing order onto a
    /// bounded queue; workers drain it concurrently and publish per-block
    /// outcomes; the collector aggregates until the range is exhausted or
    /// the scan aborts:
    ///
    /// - the first per-block error aborts the scan and discards partial
    ///   results;
    /// - exceeding [`MAX_RESULT_SIZE`] accumulated matches aborts with
    ///   [`ExecutionError::ResultTooLarge`];
    /// - cancellation of `cancel` aborts with [`ExecutionError::Cancelled`]
    ///   carrying the number of matches gathered so far.
    ///
    /// On every abort path the pool's own token is cancelled so
    /// outstanding workers stop pulling work instead of leaking.
    pub async fn scan(
        &self,
        address: Address,
        from_block: u64,
        to_block: u64,
        cancel: &CancellationToken,
    ) -> Result<Vec<TxRecord>, ExecutionError> {
        debug_assert!(from_block <= to_block);

        // Child token: aborting the scan must stop the pool without
        // cancelling the caller's context
        let pool = cancel.child_token();

        let (work_tx, work_rx) = mpsc::channel::<u64>(self.max_workers);
        let work_rx = Arc::new(Mutex::new(work_rx));
        let (outcome_tx, mut outcome_rx) = mpsc::channel::<BlockOutcome>(self.max_workers);

        let workers: Vec<_> = (0..self.max_workers)
            .map(|_| {
                let chain = Arc::clone(&self.chain);
                let work_rx = Arc::clone(&work_rx);
                let outcome_tx = outcome_tx.clone();
                let pool = pool.clone();
                tokio::spawn(async move {
                    worker_loop(chain, address, work_rx, outcome_tx, pool).await;
                })
            })
            .collect();
        // The collector learns all workers are done when the last sender drops
        drop(outcome_tx);

        let feeder = tokio::spawn({
            let pool = pool.clone();
            async move {
                for block_number in from_block..=to_block {
                    tokio::select! {
                        _ = pool.cancelled() => break,
                        sent = work_tx.send(block_number) => {
                            if sent.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        let mut matched: Vec<TxRecord> = Vec::new();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    pool.cancel();
                    warn!(gathered = matched.len(), "scan cancelled");
                    return Err(ExecutionError::Cancelled {
                        gathered: matched.len(),
                    });
                }
                outcome = outcome_rx.recv() => {
                    let Some(BlockOutcome { block_number, result }) = outcome else {
                        break; // every worker has exited
                    };
                    match result {
                        Err(e) => {
                            pool.cancel();
                            warn!(block_number, error = %e, "scan aborted on block error");
                            return Err(e.into());
                        }
                        Ok(mut records) => {
                            debug!(block_number, matches = records.len(), "block scanned");
                            matched.append(&mut records);
                            if matched.len() > MAX_RESULT_SIZE {
                                pool.cancel();
                                return Err(ExecutionError::ResultTooLarge {
                                    count: matched.len(),
                                    max: MAX_RESULT_SIZE,
                                });
                            }
                        }
                    }
                }
            }
        }

        // Pool drained; reap the tasks before reporting success
        feeder.abort();
        join_all(workers).await;

        if cancel.is_cancelled() {
            return Err(ExecutionError::Cancelled {
                gathered: matched.len(),
            });
        }

        Ok(matched)
    }
}

/// Pulls block numbers until the queue closes or the pool is cancelled,
/// publishing one outcome per block.
async fn worker_loop<C: ChainAccess>(
    chain: Arc<C>,
    address: Address,
    work_rx: Arc<Mutex<mpsc::Receiver<u64>>>,
    outcome_tx: mpsc::Sender<BlockOutcome>,
    pool: CancellationToken,
) {
    loop {
        let block_number = {
            let mut rx = work_rx.lock().await;
            tokio::select! {
                _ = pool.cancelled() => return,
                next = rx.recv() => match next {
                    Some(number) => number,
                    None => return, // queue exhausted
                },
            }
        };

        let result = chain
            .block_by_number(block_number)
            .await
            .map(|block| filter_block(block.transactions, address, block_number));

        if outcome_tx
            .send(BlockOutcome {
                block_number,
                result,
            })
            .await
            .is_err()
        {
            // Collector is gone; the scan already ended
            return;
        }
    }
}

/// Keeps the transactions sent from or to `address`, stamping each with
/// the scanned block number.
fn filter_block(transactions: Vec<TxRecord>, address: Address, block_number: u64) -> Vec<TxRecord> {
    transactions
        .into_iter()
        .filter(|tx| tx.involves(address))
        .map(|mut tx| {
            tx.block_number = block_number;
            tx
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, TxHash};

    #[test]
    fn test_filter_block_keeps_sender_and_recipient_matches() {
        let target = address!("742d35cc6634c0532925a3b844bc454e4438f44e");
        let other = address!("0000000000000000000000000000000000000009");

        let tx = |from: Address, to: Option<Address>| TxRecord {
            hash: TxHash::ZERO,
            from,
            to,
            value: Default::default(),
            nonce: 0,
            block_number: 0,
        };

        let kept = filter_block(
            vec![
                tx(target, Some(other)),
                tx(other, Some(target)),
                tx(other, Some(other)),
                tx(other, None),
            ],
            target,
            42,
        );

        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|t| t.block_number == 42));
    }

    #[test]
    fn test_worker_floor_is_one() {
        struct NeverChain;
        #[async_trait::async_trait]
        impl ChainAccess for NeverChain {
            async fn balance_at(
                &self,
                _: Address,
                _: Option<u64>,
            ) -> Result<alloy_primitives::U256, RpcError> {
                unreachable!()
            }
            async fn filter_logs(
                &self,
                _: Address,
                _: u64,
                _: u64,
            ) -> Result<Vec<alloy_rpc_types::Log>, RpcError> {
                unreachable!()
            }
            async fn block_by_number(&self, _: u64) -> Result<crate::chain::BlockData, RpcError> {
                unreachable!()
            }
            async fn current_block_number(&self) -> Result<u64, RpcError> {
                unreachable!()
            }
        }

        let scanner = RangeScanner::new(Arc::new(NeverChain), 0);
        assert_eq!(scanner.max_workers, 1);
    }
}
