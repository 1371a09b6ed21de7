//! Error type for query parsing and validation.

/// Errors produced while turning a raw query string into a [`Query`].
///
/// Parsing is total: any failure yields one of these variants and no
/// partially constructed query. Every variant carries enough context to
/// diagnose the input without echoing it back unbounded.
///
/// [`Query`]: crate::query::Query
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The input was empty, or contained only whitespace and control
    /// characters. Detected before tokenization.
    #[error("empty query")]
    EmptyQuery,

    /// The raw input exceeded the maximum accepted length.
    #[error("query too long: {length} characters (maximum: {max})")]
    QueryTooLong { length: usize, max: usize },

    /// The input matched a known SQL/script injection pattern.
    ///
    /// The offending input is deliberately not echoed back.
    #[error("query rejected: input contains a disallowed pattern")]
    InjectionRejected,

    /// The token stream did not match `SELECT <method> FROM <address>`,
    /// or carried unrecognized trailing tokens.
    #[error("invalid query format; expected SELECT <method> FROM <address> [BLOCK <from> <to>]")]
    InvalidFormat,

    /// The method token is not `BALANCE`, `LOGS`, or `TRANSACTIONS`.
    #[error("unsupported select method: {method}")]
    UnsupportedMethod { method: String },

    /// The address token is not `0x` followed by exactly 40 hex digits.
    #[error("invalid address: {address}")]
    InvalidAddress { address: String },

    /// A `BLOCK` clause was present without both block numbers.
    #[error("BLOCK clause requires both a from and a to block number")]
    MissingBlockBound,

    /// The from-block token is not a non-negative base-10 integer.
    #[error("invalid from block: {value}")]
    InvalidFromBlock { value: String },

    /// The to-block token is not a non-negative base-10 integer.
    #[error("invalid to block: {value}")]
    InvalidToBlock { value: String },

    /// `from_block` exceeded `to_block`.
    #[error("inverted block range: from block {from_block} is greater than to block {to_block}")]
    InvertedRange { from_block: u64, to_block: u64 },

    /// The block span exceeded the parse-time hard cap.
    #[error("block range too large: {span} blocks (maximum: {max})")]
    RangeTooLarge { span: u64, max: u64 },
}
