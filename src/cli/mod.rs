//! CLI argument parsing for wmdr
//!
//! Global flags: --format, --quiet, --verbose, --log-level, --log-json,
//! --config, --resources

pub mod args;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use args::{EvaluateArgs, MetricsArgs};
pub use output::OutputFormat;

/// wmdr - score WIGOS metadata records against the WMO KPI rubric
#[derive(Parser, Debug)]
#[command(name = "wmdr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Log progress at debug level
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level or filter directive (e.g. `debug`, `wmdr_core::rubric=trace`)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Configuration file (default: ./wmdr.toml when present)
    #[arg(long, global = true, env = "WMDR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Resource directory with codelists/ and maps/
    #[arg(long, global = true)]
    pub resources: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate records and report KPI scores
    Evaluate(EvaluateArgs),

    /// Compute batch statistics from previously written reports
    Metrics(MetricsArgs),

    /// List the rules of the rubric
    Rules,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_evaluate() {
        let cli = Cli::try_parse_from([
            "wmdr",
            "--format",
            "json",
            "evaluate",
            "a.xml",
            "b.xml",
            "--rule",
            "2-0-06",
            "--skip-schema",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        let Some(Commands::Evaluate(args)) = cli.command else {
            panic!("expected evaluate");
        };
        assert_eq!(args.paths.len(), 2);
        assert_eq!(args.rule.as_deref(), Some("2-0-06"));
        assert!(args.skip_schema);
    }

    #[test]
    fn test_skip_schema_conflicts_with_verdict() {
        let result = Cli::try_parse_from([
            "wmdr",
            "evaluate",
            "a.xml",
            "--skip-schema",
            "--schema-verdict",
            "verdict.json",
        ]);
        assert!(result.is_err());
    }
}
