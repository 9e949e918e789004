//! Evaluating many records at once
//!
//! Records are independent, so a batch is a parallel map over file paths.
//! A record that cannot be read or is not a WMDR document is logged and
//! left out; any other failure aborts the batch.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::bail_usage;
use crate::document::Record;
use crate::error::{Result, WmdrError};
use crate::report::Report;
use crate::rubric::{Evaluator, Selection};
use crate::schema::SchemaValidator;
use crate::trace_time;

/// Expand `paths` into input files.
///
/// Files are taken as given; directories are walked for files with
/// `extension`. The result is sorted and free of duplicates.
pub fn collect_inputs(paths: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for path in paths {
        if path.is_file() {
            inputs.push(path.clone());
        } else if path.is_dir() {
            inputs.extend(
                WalkDir::new(path)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .map(|e| e.into_path())
                    .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(extension)),
            );
        } else {
            return Err(WmdrError::not_found("input", path.display()));
        }
    }

    inputs.sort();
    inputs.dedup();
    if inputs.is_empty() {
        bail_usage!(format!("no .{} files found in the given paths", extension));
    }
    debug!(count = inputs.len(), "collected inputs");
    Ok(inputs)
}

/// Evaluate one record file.
///
/// `validator` supplies the schema verdict; `None` skips schema validation.
pub fn evaluate_file(
    evaluator: &Evaluator,
    path: &Path,
    selection: &Selection,
    validator: Option<&dyn SchemaValidator>,
) -> Result<Report> {
    let text = fs::read_to_string(path)
        .map_err(|e| WmdrError::io_operation("read record", path.display(), e))?;
    let record = Record::parse(&text)?;
    let verdict = validator.map(|v| v.validate(&record));
    evaluator.evaluate(&record, selection, verdict.as_ref())
}

/// Evaluate `paths` in parallel; reports keep the order of `paths`
pub fn evaluate_files(
    evaluator: &Evaluator,
    paths: &[PathBuf],
    selection: &Selection,
    validator: Option<&dyn SchemaValidator>,
) -> Result<Vec<(PathBuf, Report)>> {
    let start = Instant::now();
    let outcomes: Vec<_> = paths
        .par_iter()
        .map(|path| (path, evaluate_file(evaluator, path, selection, validator)))
        .collect();

    let mut reports = Vec::with_capacity(outcomes.len());
    for (path, outcome) in outcomes {
        match outcome {
            Ok(report) => reports.push((path.clone(), report)),
            Err(e) if e.is_record_error() => {
                warn!(path = %path.display(), error = %e, "skipping record");
            }
            Err(e) => return Err(e),
        }
    }

    trace_time!(start, "evaluate_files", evaluated = reports.len(), inputs = paths.len());
    Ok(reports)
}

/// Read reports previously written as JSON; unreadable ones are skipped
pub fn read_reports(paths: &[PathBuf]) -> Result<Vec<Report>> {
    let mut reports = Vec::with_capacity(paths.len());
    for path in paths {
        let content = fs::read_to_string(path)
            .map_err(|e| WmdrError::io_operation("read report", path.display(), e))?;
        let parsed = serde_json::from_str(&content)
            .map_err(WmdrError::from)
            .and_then(Report::from_json);
        match parsed {
            Ok(report) => reports.push(report),
            Err(e) => warn!(path = %path.display(), error = %e, "not an evaluation report"),
        }
    }
    debug!(count = reports.len(), "read reports");
    Ok(reports)
}

/// Output file name for the report of `input`: `<file name>_eval.json`
pub fn report_file_name(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "record".to_string());
    format!("{}_eval.json", name)
}

/// Output file names for `inputs`, in order.
///
/// Inputs sharing a file name are told apart by the directories below
/// their common ancestor: `a/x.xml` and `b/x.xml` become
/// `a_x.xml_eval.json` and `b_x.xml_eval.json`.
pub fn report_file_names(inputs: &[PathBuf]) -> Vec<String> {
    let mut by_name: BTreeMap<String, Vec<&Path>> = BTreeMap::new();
    for input in inputs {
        by_name.entry(report_file_name(input)).or_default().push(input);
    }

    inputs
        .iter()
        .map(|input| {
            let name = report_file_name(input);
            match by_name.get(&name) {
                Some(group) if group.len() > 1 => {
                    let root = common_ancestor(group);
                    let relative = input.strip_prefix(&root).unwrap_or(input);
                    let joined: Vec<String> = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect();
                    format!("{}_eval.json", joined.join("_"))
                }
                _ => name,
            }
        })
        .collect()
}

fn common_ancestor(paths: &[&Path]) -> PathBuf {
    let mut ancestor: Option<PathBuf> = None;
    for path in paths {
        let parent = path.parent().unwrap_or(Path::new(""));
        ancestor = Some(match ancestor {
            None => parent.to_path_buf(),
            Some(current) => current
                .components()
                .zip(parent.components())
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a)
                .collect(),
        });
    }
    ancestor.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_collect_inputs_walks_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("b.xml"), "<x/>").unwrap();
        fs::write(nested.join("a.xml"), "<x/>").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let inputs = collect_inputs(
            &[dir.path().to_path_buf(), dir.path().join("b.xml")],
            "xml",
        )
        .unwrap();
        assert_eq!(inputs.len(), 2);
        assert!(inputs.iter().all(|p| p.extension().unwrap() == "xml"));
    }

    #[test]
    fn test_collect_inputs_errors() {
        let dir = tempdir().unwrap();
        let err = collect_inputs(&[dir.path().to_path_buf()], "xml").unwrap_err();
        assert!(matches!(err, WmdrError::UsageError(_)));

        let err = collect_inputs(&[dir.path().join("missing.xml")], "xml").unwrap_err();
        assert!(matches!(err, WmdrError::NotFound { .. }));
    }

    #[test]
    fn test_read_reports_skips_non_reports() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        fs::write(
            &good,
            r#"{"kpi_20": {"name": "KPI-2-0", "total": 32, "score": 16, "comments": [], "percentage": 50.0}}"#,
        )
        .unwrap();
        fs::write(&bad, "[1, 2, 3]").unwrap();

        let reports = read_reports(&[good, bad]).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].get("kpi_20").unwrap().score, 16.0);
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name(Path::new("/data/0-20000-0-10393.xml")),
            "0-20000-0-10393.xml_eval.json"
        );
    }

    #[test]
    fn test_report_file_names_disambiguate_collisions() {
        let inputs = vec![
            PathBuf::from("/data/a/x.xml"),
            PathBuf::from("/data/b/x.xml"),
            PathBuf::from("/data/b/y.xml"),
        ];
        assert_eq!(
            report_file_names(&inputs),
            vec!["a_x.xml_eval.json", "b_x.xml_eval.json", "y.xml_eval.json"]
        );
    }

    #[test]
    fn test_report_file_names_nested_collision() {
        let inputs = vec![
            PathBuf::from("/data/x.xml"),
            PathBuf::from("/data/deep/er/x.xml"),
        ];
        assert_eq!(
            report_file_names(&inputs),
            vec!["x.xml_eval.json", "deep_er_x.xml_eval.json"]
        );
    }
}
