//! Query parser and validator
//!
//! Turns a raw query string into a bounds-checked [`Query`] or a
//! [`ParseError`]. Parsing is purely functional over its input: no state,
//! no side effects.
//!
//! # Grammar
//!
//! ```text
//! query  := "SELECT" method "FROM" address [ "BLOCK" integer integer ]
//! method := "BALANCE" | "LOGS" | "TRANSACTIONS"
//! ```
//!
//! Keywords are case-insensitive. Trailing tokens beyond the recognized
//! grammar are rejected.
//!
//! # Examples
//!
//! ```rust
//! use evmql::parser::Parser;
//! use evmql::query::QueryMethod;
//!
//! let parser = Parser::new();
//! let query = parser
//!     .parse("SELECT BALANCE FROM 0x742d35Cc6634C0532925a3b844Bc454e4438f44e")
//!     .unwrap();
//! assert_eq!(query.method(), QueryMethod::Balance);
//! assert!(query.from_block().is_none());
//! ```

use alloy_primitives::Address;

use crate::config::constants::{MAX_BLOCK_SPAN, MAX_QUERY_LENGTH};
use crate::errors::ParseError;
use crate::query::{Query, QueryMethod};

pub mod sanitize;

use sanitize::{
    contains_injection, is_valid_address, normalize_address, sanitize_input, truncate_for_display,
};

/// Longest prefix of a rejected token echoed back in an error message.
const DISPLAY_TRUNCATE_LEN: usize = 64;

/// Parser for the query grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Parses and validates a raw query string.
    ///
    /// The input is length-checked, sanitized, screened for injection
    /// patterns, tokenized, and validated against the grammar. Block
    /// bounds, when present, are checked for ordering and against the
    /// parse-time span cap; the tighter per-method caps are enforced by
    /// the execution engine.
    pub fn parse(&self, raw: &str) -> Result<Query, ParseError> {
        let length = raw.chars().count();
        if length > MAX_QUERY_LENGTH {
            return Err(ParseError::QueryTooLong {
                length,
                max: MAX_QUERY_LENGTH,
            });
        }

        let cleaned = sanitize_input(raw);
        if cleaned.is_empty() {
            return Err(ParseError::EmptyQuery);
        }

        if contains_injection(&cleaned) {
            return Err(ParseError::InjectionRejected);
        }

        let tokens: Vec<&str> = cleaned.split(' ').collect();
        if tokens.len() < 4
            || !tokens[0].eq_ignore_ascii_case("SELECT")
            || !tokens[2].eq_ignore_ascii_case("FROM")
        {
            return Err(ParseError::InvalidFormat);
        }

        let method_token = tokens[1].to_ascii_uppercase();
        let method = QueryMethod::from_token(&method_token).ok_or(ParseError::UnsupportedMethod {
            method: truncate_for_display(&method_token, DISPLAY_TRUNCATE_LEN),
        })?;

        let address = parse_address(tokens[3])?;

        let (from_block, to_block) = parse_block_clause(&tokens)?;

        Ok(Query::new(method, address, from_block, to_block))
    }
}

fn parse_address(token: &str) -> Result<Address, ParseError> {
    let normalized = normalize_address(token);
    if !is_valid_address(&normalized) {
        return Err(ParseError::InvalidAddress {
            address: truncate_for_display(token, DISPLAY_TRUNCATE_LEN),
        });
    }
    normalized
        .parse::<Address>()
        .map_err(|_| ParseError::InvalidAddress {
            address: truncate_for_display(token, DISPLAY_TRUNCATE_LEN),
        })
}

fn parse_block_clause(tokens: &[&str]) -> Result<(Option<u64>, Option<u64>), ParseError> {
    match tokens.len() {
        4 => Ok((None, None)),
        _ if tokens[4].eq_ignore_ascii_case("BLOCK") => {
            if tokens.len() < 7 {
                return Err(ParseError::MissingBlockBound);
            }
            if tokens.len() > 7 {
                // Trailing tokens after a complete clause are rejected
                return Err(ParseError::InvalidFormat);
            }

            let from_block =
                tokens[5]
                    .parse::<u64>()
                    .map_err(|_| ParseError::InvalidFromBlock {
                        value: truncate_for_display(tokens[5], DISPLAY_TRUNCATE_LEN),
                    })?;
            let to_block = tokens[6]
                .parse::<u64>()
                .map_err(|_| ParseError::InvalidToBlock {
                    value: truncate_for_display(tokens[6], DISPLAY_TRUNCATE_LEN),
                })?;

            if from_block > to_block {
                return Err(ParseError::InvertedRange {
                    from_block,
                    to_block,
                });
            }

            let span = to_block - from_block;
            if span > MAX_BLOCK_SPAN {
                return Err(ParseError::RangeTooLarge {
                    span,
                    max: MAX_BLOCK_SPAN,
                });
            }

            Ok((Some(from_block), Some(to_block)))
        }
        _ => Err(ParseError::InvalidFormat),
    }
}
