//! Flow query language.
//!
//! This module provides:
//! - `Predicate`, `Conjunction` and `Term`, the evaluable filter tree
//! - Parsers for `--where` filter expressions and `--select` paths

mod filter;
mod parser;

pub use filter::{CompareOp, Conjunction, Literal, Predicate, Quantifier, Term};
pub use parser::{parse_filter, parse_selection, parse_term};
