//! flowquery CLI entry point.

use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flowquery::cli::Args;
use flowquery::pipeline::Pipeline;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Set up logging; stdout carries the query output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| args.log_level().into()),
        )
        .with_writer(io::stderr)
        .init();

    let predicate = args.predicate().with_context(|| {
        format!(
            "Invalid --where expression: {}",
            args.filter.as_deref().unwrap_or_default()
        )
    })?;
    let mode = args.output_mode().context("Invalid --select path")?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let summary = Pipeline::new(predicate, mode)
        .run(&args.files, &mut out)
        .context("Flow query failed")?;

    tracing::info!(
        files = summary.files,
        flows = summary.flows,
        matched = summary.matched,
        "done"
    );
    Ok(())
}
