//! flowquery - Filter JSON network flow records.
//!
//! This library selects flows matching a boolean filter expression and
//! prints them, extracts selected fields, or computes message statistics
//! over them without buffering the matched set.
//!
//! # Example
//!
//! ```no_run
//! use flowquery::output::OutputMode;
//! use flowquery::pipeline::Pipeline;
//! use flowquery::query::Predicate;
//!
//! fn main() -> anyhow::Result<()> {
//!     let predicate: Predicate = "dp = 443 & pr = 6".parse()?;
//!     let mut stdout = std::io::stdout();
//!     Pipeline::new(predicate, OutputMode::Full).run(&["flows.json"], &mut stdout)?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod flow;
pub mod io;
pub mod output;
pub mod pipeline;
pub mod query;
pub mod stats;

pub use error::{Error, Result};
