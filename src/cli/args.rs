//! Subcommand arguments

use std::path::PathBuf;

use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Record files or directories of `.xml` records
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Evaluate one rule or sub-rule only (e.g. `20`, `kpi_31`, `2-0-06`)
    #[arg(long, short)]
    pub rule: Option<String>,

    /// Print only the summary of each record
    #[arg(long)]
    pub summary: bool,

    /// Group results by category
    #[arg(long)]
    pub group: bool,

    /// Skip schema validation; the mandatory rule is left out
    #[arg(long, short)]
    pub skip_schema: bool,

    /// JSON verdict from an external schema validator (`{"valid": bool, "errors": [..]}`)
    #[arg(long, conflicts_with = "skip_schema")]
    pub schema_verdict: Option<PathBuf>,

    /// Write one `<file>_eval.json` report per record into this directory
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,

    /// Write batch statistics to this file
    #[arg(long, short)]
    pub metrics: Option<PathBuf>,

    /// Instant used as "now" by near-real-time checks (RFC 3339)
    #[arg(long)]
    pub reference_time: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct MetricsArgs {
    /// Report files or directories of `.json` reports
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Write the statistics to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}
