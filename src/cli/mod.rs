//! Command-line interface module.
//!
//! Argument parsing via clap, and the mapping from flags to an output mode
//! and filter predicate.

mod args;

pub use args::Args;
