//! Structured query representation
//!
//! A [`Query`] is the immutable output of the parser and the sole input to
//! the execution engine. It is constructed exactly once by
//! [`Parser::parse`](crate::parser::Parser::parse) and exposes read-only
//! accessors; nothing downstream can mutate a parsed query.

use std::fmt;

use alloy_primitives::{Address, TxHash, U256};
use alloy_rpc_types::Log;
use serde::{Deserialize, Serialize};

/// Retrieval method selected by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryMethod {
    /// Point balance lookup for an account.
    Balance,
    /// Ranged event-log fetch for an address.
    Logs,
    /// Concurrent per-block transaction scan for an address.
    Transactions,
}

impl QueryMethod {
    /// Parses an already-uppercased method token.
    pub(crate) fn from_token(token: &str) -> Option<Self> {
        match token {
            "BALANCE" => Some(QueryMethod::Balance),
            "LOGS" => Some(QueryMethod::Logs),
            "TRANSACTIONS" => Some(QueryMethod::Transactions),
            _ => None,
        }
    }

    /// Cache key prefix for this method.
    pub fn cache_prefix(&self) -> &'static str {
        match self {
            QueryMethod::Balance => "balance",
            QueryMethod::Logs => "logs",
            QueryMethod::Transactions => "transactions",
        }
    }
}

impl fmt::Display for QueryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryMethod::Balance => "BALANCE",
            QueryMethod::Logs => "LOGS",
            QueryMethod::Transactions => "TRANSACTIONS",
        };
        f.write_str(name)
    }
}

/// A parsed, bounds-checked query.
///
/// Invariants established by the parser and relied upon downstream:
///
/// - the address is canonical (lowercase, `0x`-prefixed, 20 bytes);
/// - when both block bounds are present, `from_block <= to_block` and the
///   span does not exceed the parse-time hard cap.
///
/// Method-specific range caps are re-checked by the execution engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    method: QueryMethod,
    address: Address,
    from_block: Option<u64>,
    to_block: Option<u64>,
}

impl Query {
    pub(crate) fn new(
        method: QueryMethod,
        address: Address,
        from_block: Option<u64>,
        to_block: Option<u64>,
    ) -> Self {
        Self {
            method,
            address,
            from_block,
            to_block,
        }
    }

    /// The retrieval method.
    pub fn method(&self) -> QueryMethod {
        self.method
    }

    /// The target account or contract address, canonicalized.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Lower block bound, if a `BLOCK` clause was given.
    pub fn from_block(&self) -> Option<u64> {
        self.from_block
    }

    /// Upper block bound, if a `BLOCK` clause was given.
    pub fn to_block(&self) -> Option<u64> {
        self.to_block
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM {}", self.method, self.address)?;
        if let (Some(from), Some(to)) = (self.from_block, self.to_block) {
            write!(f, " BLOCK {from} {to}")?;
        }
        Ok(())
    }
}

/// Projection of a matched transaction kept by the range scanner.
///
/// Carries the fields needed to display or post-process a match without
/// retaining the full RPC envelope. `to` is `None` for contract creations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRecord {
    pub hash: TxHash,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub nonce: u64,
    pub block_number: u64,
}

impl TxRecord {
    /// Whether this transaction was sent from or to `address`.
    pub fn involves(&self, address: Address) -> bool {
        self.from == address || self.to == Some(address)
    }
}

/// The value produced by executing a query, and the unit stored in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryResult {
    /// Account balance in wei.
    Balance(U256),
    /// Event logs emitted by the address over the requested range.
    Logs(Vec<Log>),
    /// Transactions involving the address over the scanned range.
    ///
    /// Concurrent scanning does not guarantee block order; sort explicitly
    /// if a stable order is required.
    Transactions(Vec<TxRecord>),
}

impl QueryResult {
    /// Number of items carried by this result (1 for a balance).
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Balance(_) => 1,
            QueryResult::Logs(logs) => logs.len(),
            QueryResult::Transactions(txs) => txs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
