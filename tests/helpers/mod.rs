// SPDX-FileCopyrightText: 2026 EVMQL Contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for evmql integration tests
//!
//! Provides a scripted chain-access implementation so the engine and
//! scanner can be exercised without a real blockchain connection.

// Each integration test binary compiles this module independently and
// uses a different subset of it
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use alloy_primitives::{Address, LogData, TxHash, B256, U256};
use alloy_rpc_types::Log;
use async_trait::async_trait;
use evmql::{BlockData, ChainAccess, RpcError, TxRecord};

/// Scripted [`ChainAccess`] implementation.
///
/// Balances, logs, and per-block transaction lists are configured up
/// front; call counters allow asserting that the cache short-circuited
/// the chain. Blocks without a configured transaction list are served
/// empty.
#[derive(Default)]
pub struct MockChain {
    balances: Mutex<HashMap<(Address, Option<u64>), U256>>,
    logs: Mutex<Vec<Log>>,
    blocks: Mutex<HashMap<u64, Vec<TxRecord>>>,
    head: u64,
    failing_block: Option<u64>,
    fetch_delay: Duration,
    pub balance_calls: AtomicUsize,
    pub logs_calls: AtomicUsize,
    pub block_calls: AtomicUsize,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(self, address: Address, block: Option<u64>, balance: U256) -> Self {
        self.balances
            .lock()
            .unwrap()
            .insert((address, block), balance);
        self
    }

    pub fn with_logs(self, logs: Vec<Log>) -> Self {
        *self.logs.lock().unwrap() = logs;
        self
    }

    pub fn with_block(self, number: u64, transactions: Vec<TxRecord>) -> Self {
        self.blocks.lock().unwrap().insert(number, transactions);
        self
    }

    pub fn with_head(mut self, head: u64) -> Self {
        self.head = head;
        self
    }

    /// Makes `block_by_number(number)` fail with a block fetch error.
    pub fn with_failing_block(mut self, number: u64) -> Self {
        self.failing_block = Some(number);
        self
    }

    /// Adds latency to every block fetch, for cancellation tests.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }
}

#[async_trait]
impl ChainAccess for MockChain {
    async fn balance_at(&self, address: Address, block: Option<u64>) -> Result<U256, RpcError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        let balances = self.balances.lock().unwrap();
        balances
            .get(&(address, block))
            .copied()
            .ok_or_else(|| RpcError::get_balance_failed(address, io_error("no scripted balance")))
    }

    async fn filter_logs(
        &self,
        _address: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>, RpcError> {
        self.logs_calls.fetch_add(1, Ordering::SeqCst);
        let _ = (from_block, to_block);
        Ok(self.logs.lock().unwrap().clone())
    }

    async fn block_by_number(&self, number: u64) -> Result<BlockData, RpcError> {
        self.block_calls.fetch_add(1, Ordering::SeqCst);

        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }

        if self.failing_block == Some(number) {
            return Err(RpcError::get_block_failed(number, io_error("scripted failure")));
        }

        let transactions = self
            .blocks
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .unwrap_or_default();

        Ok(BlockData {
            number,
            transactions,
        })
    }

    async fn current_block_number(&self) -> Result<u64, RpcError> {
        Ok(self.head)
    }
}

fn io_error(message: &str) -> std::io::Error {
    std::io::Error::other(message.to_string())
}

/// A transaction sent to `to`, distinguishable by `nonce`.
#[allow(dead_code)]
pub fn tx_to(from: Address, to: Address, nonce: u64) -> TxRecord {
    TxRecord {
        hash: TxHash::ZERO,
        from,
        to: Some(to),
        value: U256::from(1u64),
        nonce,
        block_number: 0,
    }
}

/// A minimal log emitted by `address`.
#[allow(dead_code)]
pub fn test_log(address: Address, log_index: u64) -> Log {
    Log {
        inner: alloy_primitives::Log {
            address,
            data: LogData::new(vec![B256::ZERO], Default::default()).unwrap(),
        },
        block_hash: Some(B256::ZERO),
        block_number: Some(1000),
        block_timestamp: Some(1234567890),
        transaction_hash: Some(B256::ZERO),
        transaction_index: Some(0),
        log_index: Some(log_index),
        removed: false,
    }
}
