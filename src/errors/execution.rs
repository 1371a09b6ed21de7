//! Error type for query execution.

use crate::errors::RpcError;
use crate::query::QueryMethod;

/// Errors raised by the execution engine or the range scanner.
///
/// Upstream failures wrap the underlying [`RpcError`] without discarding
/// it; nothing at this layer retries. Cancellation reports how many
/// results had been gathered when the governing deadline or token fired.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The method requires an explicit `BLOCK` clause and none was given.
    #[error("both from and to block numbers must be specified for a {method} query")]
    MissingRange { method: QueryMethod },

    /// The requested span exceeds the method's cap.
    #[error("block range too large for {method} query: {span} blocks (maximum: {max})")]
    RangeTooLarge {
        method: QueryMethod,
        span: u64,
        max: u64,
    },

    /// The fetched or accumulated result exceeded the result-size cap.
    ///
    /// Oversized results are never cached; narrow the block range instead.
    #[error("result too large: {count} items (maximum: {max}) - narrow the block range")]
    ResultTooLarge { count: usize, max: usize },

    /// A chain-access call failed.
    #[error("upstream failure: {0}")]
    Upstream(#[from] RpcError),

    /// The governing deadline or cancellation token fired mid-execution.
    #[error("query cancelled after gathering {gathered} results")]
    Cancelled { gathered: usize },
}

impl ExecutionError {
    /// Whether this error originated upstream rather than from a guardrail.
    pub fn is_upstream(&self) -> bool {
        matches!(self, ExecutionError::Upstream(_))
    }
}
