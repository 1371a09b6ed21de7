// SPDX-FileCopyrightText: 2026 EVMQL Contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Alloy-backed chain access

use alloy_network::TransactionResponse;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types::{BlockId, BlockNumberOrTag, Filter, Log, Transaction, TransactionTrait};
use async_trait::async_trait;
use tracing::debug;

use super::{BlockData, ChainAccess};
use crate::errors::RpcError;
use crate::parser::sanitize::redact_endpoint;
use crate::query::TxRecord;

/// Production [`ChainAccess`] implementation over an alloy provider.
///
/// The endpoint label kept for diagnostics is redacted at construction;
/// no error or log line produced here ever carries raw credentials.
pub struct AlloyChainAccess<P> {
    provider: P,
    endpoint: String,
}

impl<P: Provider> AlloyChainAccess<P> {
    /// Wraps a provider. `endpoint` is the URL the provider was built
    /// from, used only as a redacted diagnostic label.
    pub fn new(provider: P, endpoint: &str) -> Self {
        Self {
            provider,
            endpoint: redact_endpoint(endpoint),
        }
    }

    /// The redacted endpoint label.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Projects an RPC transaction into the record kept by the scanner.
///
/// Sender recovery already happened when the provider decoded the
/// envelope, so projection cannot fail; a transaction the provider could
/// not decode never reaches this point.
fn to_record(tx: &Transaction, block_number: u64) -> TxRecord {
    TxRecord {
        hash: TransactionResponse::tx_hash(tx),
        from: TransactionResponse::from(tx),
        to: TransactionTrait::to(tx),
        value: TransactionTrait::value(tx),
        nonce: TransactionTrait::nonce(tx),
        block_number: tx.block_number.unwrap_or(block_number),
    }
}

#[async_trait]
impl<P: Provider> ChainAccess for AlloyChainAccess<P> {
    async fn balance_at(&self, address: Address, block: Option<u64>) -> Result<U256, RpcError> {
        let call = self.provider.get_balance(address);
        let call = match block {
            Some(number) => call.block_id(BlockId::number(number)),
            None => call,
        };
        call.await
            .map_err(|e| RpcError::get_balance_failed(address, e))
    }

    async fn filter_logs(
        &self,
        address: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>, RpcError> {
        let filter = Filter::new()
            .address(address)
            .from_block(from_block)
            .to_block(to_block);

        self.provider
            .get_logs(&filter)
            .await
            .map_err(|e| RpcError::get_logs_failed(from_block, to_block, e))
    }

    async fn block_by_number(&self, number: u64) -> Result<BlockData, RpcError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .full()
            .await
            .map_err(|e| RpcError::get_block_failed(number, e))?
            .ok_or(RpcError::BlockNotFound {
                block_number: number,
            })?;

        if block.transactions.is_hashes() {
            // Endpoint ignored the full-transactions request; nothing to scan
            debug!(
                block_number = number,
                endpoint = %self.endpoint,
                "block returned without full transactions"
            );
        }

        let transactions = block
            .transactions
            .txns()
            .map(|tx| to_record(tx, number))
            .collect();

        Ok(BlockData {
            number,
            transactions,
        })
    }

    async fn current_block_number(&self) -> Result<u64, RpcError> {
        self.provider
            .get_block_number()
            .await
            .map_err(RpcError::get_block_number_failed)
    }
}
