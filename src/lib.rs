pub mod cache;
pub mod chain;
pub mod config;
pub mod errors;
pub mod executor;
pub mod parser;
pub mod query;

pub use cache::{CacheInvalidator, CacheStats, InMemoryCache, NoOpCache, QueryCache};
pub use chain::{AlloyChainAccess, BlockData, ChainAccess};
pub use config::{CacheConfig, ExecutorConfig};
pub use errors::{EvmqlError, ExecutionError, ParseError, RpcError};
pub use executor::{Executor, RangeScanner};
pub use parser::Parser;
pub use query::{Query, QueryMethod, QueryResult, TxRecord};
