//! Chain-access collaborator boundary
//!
//! The execution engine talks to the blockchain exclusively through the
//! [`ChainAccess`] trait: four read operations against a single endpoint.
//! [`AlloyChainAccess`] is the production implementation over any alloy
//! provider; tests substitute scripted implementations.
//!
//! Wire protocol, transport, and retry behavior all belong to the
//! provider behind the trait, not to this crate.

use alloy_primitives::{Address, U256};
use alloy_rpc_types::Log;
use async_trait::async_trait;

use crate::errors::RpcError;
use crate::query::TxRecord;

mod alloy;

pub use alloy::AlloyChainAccess;

/// A fetched block: its height and its ordered transaction list, already
/// projected to [`TxRecord`]s at the boundary.
#[derive(Debug, Clone)]
pub struct BlockData {
    pub number: u64,
    pub transactions: Vec<TxRecord>,
}

/// Read operations consumed from the chain-access endpoint.
///
/// One endpoint per process; the endpoint is assumed trustworthy (no
/// response verification against chain consensus happens here).
#[async_trait]
pub trait ChainAccess: Send + Sync {
    /// Balance of `address` at `block`, or at the latest block when `None`.
    async fn balance_at(&self, address: Address, block: Option<u64>) -> Result<U256, RpcError>;

    /// Logs emitted by `address` over `[from_block, to_block]`, inclusive.
    async fn filter_logs(
        &self,
        address: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>, RpcError>;

    /// The block at `number` with its full, ordered transaction list.
    async fn block_by_number(&self, number: u64) -> Result<BlockData, RpcError>;

    /// The current chain head height.
    async fn current_block_number(&self) -> Result<u64, RpcError>;
}
