//! `wmdr evaluate` command - score records against the rubric
//!
//! Records are evaluated in parallel. Reports are printed, or written one
//! file per record with `--output-dir`; `--metrics` adds batch statistics.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::info;
use wmdr_core::batch;
use wmdr_core::config::EngineConfig;
use wmdr_core::error::{Result, WmdrError};
use wmdr_core::report::{GroupedReport, Report, RuleResult, Summary};
use wmdr_core::rubric::{EvaluationOptions, Rubric, Selection};
use wmdr_core::schema::{SchemaValidator, SchemaVerdict, StructuralValidator};
use wmdr_core::stats::BatchStats;

use crate::cli::{Cli, EvaluateArgs, OutputFormat};
use crate::commands::dispatch::{trace_command, CommandContext};
use crate::commands::format::{percent, points, print_json, write_json};

/// Execute the evaluate command
pub fn execute(ctx: &CommandContext, args: &EvaluateArgs) -> Result<()> {
    let config = ctx.config()?;
    let rubric = config.rubric()?;
    let selection = Selection::parse(args.rule.as_deref());
    rubric.resolve(&selection)?;

    let inputs = batch::collect_inputs(&args.paths, "xml")?;
    let options = evaluation_options(&config, args.reference_time.as_deref())?;
    let validator = schema_validator(args)?;

    let resources = ctx.resources(&config)?;
    trace_command!(ctx.start, "load_resources");

    let evaluator = resources.evaluator(rubric).with_options(options);
    let reports = batch::evaluate_files(&evaluator, &inputs, &selection, validator.as_deref())?;
    trace_command!(ctx.start, "evaluate");
    info!(inputs = inputs.len(), evaluated = reports.len(), "evaluation finished");

    if let Some(path) = &args.metrics {
        write_json(path, &BatchStats::from_reports(reports.iter().map(|(_, r)| r)))?;
    }

    if let Some(dir) = &args.output_dir {
        let written = write_reports(dir, &reports)?;
        return output_written(ctx.cli, dir, &written);
    }

    match ctx.cli.format {
        OutputFormat::Json => output_json(args, evaluator.rubric(), &reports),
        OutputFormat::Human => {
            output_human(ctx.cli, args, evaluator.rubric(), &reports);
            Ok(())
        }
    }
}

fn evaluation_options(config: &EngineConfig, reference_time: Option<&str>) -> Result<EvaluationOptions> {
    let mut options = config.evaluation_options();
    if let Some(raw) = reference_time {
        options.reference_time = DateTime::parse_from_rfc3339(raw)
            .map_err(|e| WmdrError::invalid_value("reference time", format!("{} ({})", raw, e)))?
            .with_timezone(&Utc);
    }
    Ok(options)
}

/// `None` skips schema validation altogether
fn schema_validator(args: &EvaluateArgs) -> Result<Option<Box<dyn SchemaValidator>>> {
    if args.skip_schema {
        return Ok(None);
    }
    match &args.schema_verdict {
        Some(path) => Ok(Some(Box::new(SchemaVerdict::load(path)?))),
        None => Ok(Some(Box::new(StructuralValidator))),
    }
}

fn write_reports(dir: &Path, reports: &[(PathBuf, Report)]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| WmdrError::io_operation("create", dir.display(), e))?;
    let inputs: Vec<PathBuf> = reports.iter().map(|(input, _)| input.clone()).collect();
    reports
        .iter()
        .zip(batch::report_file_names(&inputs))
        .map(|((_, report), name)| {
            let path = dir.join(name);
            write_json(&path, report)?;
            Ok(path)
        })
        .collect()
}

fn output_written(cli: &Cli, dir: &Path, written: &[PathBuf]) -> Result<()> {
    match cli.format {
        OutputFormat::Json => {
            let reports: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
            print_json(&json!({
                "output_dir": dir.display().to_string(),
                "reports": reports,
            }))
        }
        OutputFormat::Human => {
            if !cli.quiet {
                println!("Wrote {} report(s) to {}", written.len(), dir.display());
            }
            Ok(())
        }
    }
}

/// The JSON shape of one report under the requested view
fn report_view(args: &EvaluateArgs, rubric: &Rubric, report: &Report) -> Result<Value> {
    let value = if let Some(summary) = report.summary.as_ref().filter(|_| args.summary) {
        serde_json::to_value(summary)?
    } else if args.group {
        serde_json::to_value(GroupedReport::from_report(report, rubric))?
    } else {
        serde_json::to_value(report)?
    };
    Ok(value)
}

fn output_json(args: &EvaluateArgs, rubric: &Rubric, reports: &[(PathBuf, Report)]) -> Result<()> {
    if let [(_, report)] = reports {
        return print_json(&report_view(args, rubric, report)?);
    }

    let mut by_path = Map::new();
    for (path, report) in reports {
        by_path.insert(path.display().to_string(), report_view(args, rubric, report)?);
    }
    print_json(&by_path)
}

fn output_human(cli: &Cli, args: &EvaluateArgs, rubric: &Rubric, reports: &[(PathBuf, Report)]) {
    if reports.is_empty() {
        if !cli.quiet {
            println!("No records evaluated");
        }
        return;
    }

    for (index, (path, report)) in reports.iter().enumerate() {
        if index > 0 {
            println!();
        }
        match report.identifier() {
            Some(identifier) if !identifier.is_empty() => {
                println!("{} ({})", path.display(), identifier)
            }
            _ => println!("{}", path.display()),
        }

        // A single-rule report has no summary, so its results are shown
        if !args.summary || report.summary.is_none() {
            if args.group {
                print_grouped(cli, &GroupedReport::from_report(report, rubric));
            } else {
                for (key, result) in &report.results {
                    print_result(cli, key, result);
                }
            }
        }
        if let Some(summary) = &report.summary {
            print_summary(summary);
        }
    }
}

fn print_grouped(cli: &Cli, grouped: &GroupedReport) {
    for category in &grouped.categories {
        println!(
            "  [{}] {}/{} ({})",
            category.category.as_str(),
            points(category.summary.score),
            points(category.summary.total),
            percent(category.summary.percentage)
        );
        for (key, result) in &category.results {
            print_result(cli, key, result);
        }
    }
}

fn print_result(cli: &Cli, key: &str, result: &RuleResult) {
    println!(
        "  {:<10} {:<60} {:>7}/{:<5} {}",
        key,
        result.name,
        points(result.score),
        points(result.total),
        percent(result.percentage)
    );
    if !cli.quiet {
        for comment in &result.comments {
            println!("      - {}", comment);
        }
    }
}

fn print_summary(summary: &Summary) {
    let grade = summary
        .grade
        .map(|g| g.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  summary: {}/{} ({}) grade {}",
        points(summary.totals.score),
        points(summary.totals.total),
        percent(summary.totals.percentage),
        grade
    );
}
