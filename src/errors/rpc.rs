//! Chain-boundary failure vocabulary.
//!
//! Every operation on the chain-access collaborator maps its transport
//! failure into one of these variants, keeping the original error as a
//! `source` so nothing is discarded on the way up.

use alloy_primitives::Address;

/// Errors surfaced by the chain-access collaborator.
///
/// Variants distinguish the operation that failed so callers can report
/// "failed to fetch block 1000" rather than a bare transport error. The
/// display text never embeds a raw endpoint URL; implementations label
/// themselves with a pre-redacted endpoint instead.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The balance lookup failed (network, provider, or encoding).
    #[error("failed to fetch balance for {address}")]
    GetBalanceFailed {
        address: Address,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The log filter call failed.
    #[error("failed to fetch logs for blocks {from_block}-{to_block}")]
    GetLogsFailed {
        from_block: u64,
        to_block: u64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The block fetch RPC call failed.
    ///
    /// Different from [`BlockNotFound`]: the call itself failed, not the
    /// block's existence.
    ///
    /// [`BlockNotFound`]: RpcError::BlockNotFound
    #[error("failed to fetch block {block_number}")]
    GetBlockFailed {
        block_number: u64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The block does not exist at the queried height (beyond the tip, or
    /// pruned/reorged away).
    #[error("block not found: {block_number}")]
    BlockNotFound { block_number: u64 },

    /// The chain head lookup failed.
    #[error("failed to get current block number")]
    GetBlockNumberFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RpcError {
    /// Helper to create a `GetBalanceFailed` error from any error type.
    pub fn get_balance_failed(
        address: Address,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::GetBalanceFailed {
            address,
            source: Box::new(source),
        }
    }

    /// Helper to create a `GetLogsFailed` error from any error type.
    pub fn get_logs_failed(
        from_block: u64,
        to_block: u64,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::GetLogsFailed {
            from_block,
            to_block,
            source: Box::new(source),
        }
    }

    /// Helper to create a `GetBlockFailed` error from any error type.
    pub fn get_block_failed(
        block_number: u64,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::GetBlockFailed {
            block_number,
            source: Box::new(source),
        }
    }

    /// Helper to create a `GetBlockNumberFailed` error from any error type.
    pub fn get_block_number_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        RpcError::GetBlockNumberFailed {
            source: Box::new(source),
        }
    }
}
