//! Error types for the evmql library.
//!
//! This module provides strongly-typed errors for all public APIs. It
//! follows a hybrid approach:
//!
//! - **Family-specific errors** for fine-grained handling ([`ParseError`],
//!   [`ExecutionError`], [`RpcError`])
//! - **Unified error type** ([`EvmqlError`]) for convenience when the
//!   caller does not need to distinguish the source
//!
//! # Architecture
//!
//! - [`ParseError`] - synchronous failures from the parser/validator; a
//!   failing parse yields no query.
//! - [`ExecutionError`] - failures from the execution engine and range
//!   scanner, including wrapped upstream errors and cancellation.
//! - [`RpcError`] - the chain-access boundary vocabulary, wrapped into
//!   `ExecutionError::Upstream` by the engine.
//!
//! # Examples
//!
//! ## Fine-grained error handling
//!
//! ```rust,ignore
//! use evmql::{ExecutionError, Parser};
//!
//! let query = Parser::new().parse(input)?;
//! match executor.execute(&query).await {
//!     Ok(result) => println!("{result:?}"),
//!     Err(ExecutionError::RangeTooLarge { span, max, .. }) => {
//!         eprintln!("narrow the range: {span} > {max}");
//!     }
//!     Err(ExecutionError::Upstream(rpc_err)) => {
//!         eprintln!("chain access failed: {rpc_err}");
//!     }
//!     Err(e) => eprintln!("error: {e}"),
//! }
//! ```
//!
//! ## Using the unified error type
//!
//! ```rust,ignore
//! use evmql::EvmqlError;
//!
//! async fn run(input: &str) -> Result<(), EvmqlError> {
//!     let query = Parser::new().parse(input)?;
//!     let result = executor.execute(&query).await?;
//!     // Both families convert via From implementations
//!     Ok(())
//! }
//! ```

mod execution;
mod parse;
mod rpc;

pub use execution::ExecutionError;
pub use parse::ParseError;
pub use rpc::RpcError;

/// Unified error type for all evmql operations.
///
/// Wraps both error families so `?` propagates naturally from parsing
/// straight through execution.
#[derive(Debug, thiserror::Error)]
pub enum EvmqlError {
    /// The query string failed parsing or validation.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The parsed query failed during execution.
    #[error("execution error: {0}")]
    Execution(#[from] ExecutionError),
}
