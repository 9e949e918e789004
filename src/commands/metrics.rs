//! `wmdr metrics` command - statistics over written reports

use wmdr_core::batch;
use wmdr_core::bail_usage;
use wmdr_core::error::Result;
use wmdr_core::stats::BatchStats;

use crate::cli::{MetricsArgs, OutputFormat};
use crate::commands::dispatch::{trace_command, CommandContext};
use crate::commands::format::{percent, points, print_json, write_json};

/// Execute the metrics command
pub fn execute(ctx: &CommandContext, args: &MetricsArgs) -> Result<()> {
    let inputs = batch::collect_inputs(&args.paths, "json")?;
    let reports = batch::read_reports(&inputs)?;
    if reports.is_empty() {
        bail_usage!("no evaluation reports found in the given paths");
    }
    let stats = BatchStats::from_reports(&reports);
    trace_command!(ctx.start, "batch_stats");

    if let Some(path) = &args.output {
        write_json(path, &stats)?;
        if !ctx.cli.quiet && ctx.cli.format == OutputFormat::Human {
            println!("Wrote statistics for {} report(s) to {}", stats.count, path.display());
        }
        return Ok(());
    }

    match ctx.cli.format {
        OutputFormat::Json => print_json(&stats),
        OutputFormat::Human => {
            print_human(&stats);
            Ok(())
        }
    }
}

fn print_human(stats: &BatchStats) {
    println!("Reports: {}", stats.count);

    if let Some(overall) = &stats.overall {
        println!(
            "Average: {} points ({})",
            points(overall.average_score),
            percent(Some(overall.average_percentage))
        );
        let median = overall.percentiles.get(&50).map(|p| p.value);
        println!("Median: {}", percent(median));
        println!("Grades:");
        for (grade, share) in &overall.grade_counts {
            println!("  {}  {:>5}  {}", grade, share.count, percent(Some(share.percentage)));
        }
    }

    if stats.kpi.is_empty() {
        return;
    }
    println!("Rules:");
    for (key, rule) in &stats.kpi {
        println!(
            "  {:<10} {:<60} {:>7} {}",
            key,
            rule.name.as_deref().unwrap_or(""),
            points(rule.average_score),
            percent(Some(rule.average_percentage))
        );
    }
}
