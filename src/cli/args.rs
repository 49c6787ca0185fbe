//! Command-line argument definitions.

use clap::Parser;
use std::path::PathBuf;

use crate::error::QueryError;
use crate::output::{OutputMode, StatsOptions};
use crate::query::{parse_filter, parse_selection, Predicate};

const USAGE_EXAMPLES: &str = "\
EXAMPLE
  flowquery sample.json --where \" non_norm_stats[any].b = 478 & pr = 6\" --select dp

FILTER examples:
  dp = 443
  dp > 1024
  sa = 10.0.0.1
  pr = 17
  bd[all] > 10
  bd[any] > 10
  non_norm_stats[any].b = 41 & ip = 2
  non_norm_stats[all].ipt < 5 & dp = 80
  dp = 80 | dp = 443

SELECTION examples:
  dp
  sa
  ohttp.uri
  non_norm_stats
  non_norm_stats.ipt";

/// Filter JSON flow data and print out matching flows, selected fields, or stats.
#[derive(Parser, Debug)]
#[command(name = "flowquery")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true, after_help = USAGE_EXAMPLES)]
pub struct Args {
    /// JSON flow files to process (gzip-compressed files are accepted)
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Filter flows, e.g. "dp = 443 | sp = 443"
    #[arg(long = "where", value_name = "EXPR")]
    pub filter: Option<String>,

    /// Select a field to output instead of whole flows
    #[arg(long = "select", value_name = "PATH")]
    pub selection: Option<String>,

    /// Print message statistics over the matching flows
    #[arg(long = "stats")]
    pub stats: bool,

    /// Print the field names and types of the first matching flow
    #[arg(long = "schema")]
    pub schema: bool,

    /// With --stats, also print a per-destination-port table
    #[arg(long = "per-port", requires = "stats")]
    pub per_port: bool,

    /// With --stats, also print the message length histogram
    #[arg(long = "lengths", requires = "stats")]
    pub lengths: bool,

    /// With --stats, also print the inter-arrival time histogram
    #[arg(long = "times", requires = "stats")]
    pub times: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Pick the output strategy: `--select` wins over `--schema`, which wins
    /// over `--stats`; the default is the full flow listing.
    pub fn output_mode(&self) -> Result<OutputMode, QueryError> {
        if let Some(selection) = &self.selection {
            return Ok(OutputMode::Select(parse_selection(selection)?));
        }
        if self.schema {
            return Ok(OutputMode::Schema);
        }
        if self.stats {
            return Ok(OutputMode::Stats(StatsOptions {
                per_port: self.per_port,
                lengths: self.lengths,
                times: self.times,
            }));
        }
        Ok(OutputMode::Full)
    }

    /// Parse the `--where` expression; absent means match everything.
    pub fn predicate(&self) -> Result<Predicate, QueryError> {
        parse_filter(self.filter.as_deref())
    }

    /// Default log level for the verbosity count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FieldPath;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("flowquery").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_arguments_is_an_error() {
        assert!(Args::try_parse_from(["flowquery"]).is_err());
    }

    #[test]
    fn test_files_and_filter() {
        let args = parse(&["a.json", "b.json.gz", "--where", "dp = 443"]);
        assert_eq!(args.files.len(), 2);
        assert_eq!(args.output_mode().unwrap(), OutputMode::Full);
        assert_eq!(args.predicate().unwrap().groups().len(), 1);
    }

    #[test]
    fn test_mode_precedence() {
        let args = parse(&["a.json", "--stats", "--schema", "--select", "dp"]);
        assert_eq!(
            args.output_mode().unwrap(),
            OutputMode::Select(FieldPath::parse("dp").unwrap())
        );

        let args = parse(&["a.json", "--stats", "--schema"]);
        assert_eq!(args.output_mode().unwrap(), OutputMode::Schema);

        let args = parse(&["a.json", "--stats", "--per-port", "--times"]);
        assert_eq!(
            args.output_mode().unwrap(),
            OutputMode::Stats(StatsOptions {
                per_port: true,
                lengths: false,
                times: true,
            })
        );
    }

    #[test]
    fn test_histogram_flags_require_stats() {
        assert!(Args::try_parse_from(["flowquery", "a.json", "--lengths"]).is_err());
    }

    #[test]
    fn test_bad_expressions_surface_as_query_errors() {
        let args = parse(&["a.json", "--where", "dp"]);
        assert!(matches!(
            args.predicate(),
            Err(QueryError::MissingOperator { .. })
        ));

        let args = parse(&["a.json", "--select", "a.b.c"]);
        assert!(matches!(
            args.output_mode(),
            Err(QueryError::UnsupportedPath { .. })
        ));
    }

    #[test]
    fn test_log_level() {
        assert_eq!(parse(&["a.json"]).log_level(), "warn");
        assert_eq!(parse(&["a.json", "-vv"]).log_level(), "debug");
        assert_eq!(parse(&["a.json", "-vvvv"]).log_level(), "trace");
    }
}
