//! Resource guardrail constants
//!
//! Centralizes the hard caps enforced by the parser and the execution
//! engine, improving discoverability and keeping parse-time and
//! execution-time checks in agreement.

/// Maximum accepted length of a raw query string, in characters.
pub const MAX_QUERY_LENGTH: usize = 10_000;

/// Method-agnostic block span cap enforced at parse time.
///
/// Tighter per-method caps are enforced again by the execution engine.
pub const MAX_BLOCK_SPAN: u64 = 10_000;

/// Block span cap for `LOGS` queries.
pub const LOGS_MAX_BLOCK_SPAN: u64 = 10_000;

/// Block span cap for `TRANSACTIONS` queries.
pub const TRANSACTIONS_MAX_BLOCK_SPAN: u64 = 1_000;

/// Cap on the number of items in a single result (logs fetched, or
/// transactions accumulated by a scan). Oversized results are rejected
/// and never cached.
pub const MAX_RESULT_SIZE: usize = 10_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cap_is_not_tighter_than_method_caps() {
        // The parse-time cap must admit every range the engine can accept
        assert!(MAX_BLOCK_SPAN >= LOGS_MAX_BLOCK_SPAN);
        assert!(MAX_BLOCK_SPAN >= TRANSACTIONS_MAX_BLOCK_SPAN);
    }
}
