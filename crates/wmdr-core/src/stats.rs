//! Statistics over many evaluation reports

use std::collections::BTreeMap;

use serde::Serialize;

use crate::report::{Grade, Report, RuleResult};

/// Percentile ranks reported for every series
pub const PERCENTILES: [u8; 6] = [5, 10, 25, 50, 75, 95];

/// A percentile: the index into the sorted series and the value there
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Percentile {
    pub count: usize,
    pub value: f64,
}

/// Percentiles of `values` (missing values count as 0).
///
/// The index for rank `p` is `floor(p / 100 * n)`, clamped to the last
/// element. An empty series has no percentiles.
pub fn percentiles(values: &[Option<f64>]) -> BTreeMap<u8, Percentile> {
    let mut sorted: Vec<f64> = values.iter().map(|v| v.unwrap_or(0.0)).collect();
    sorted.sort_by(f64::total_cmp);

    let Some(last) = sorted.len().checked_sub(1) else {
        return BTreeMap::new();
    };
    PERCENTILES
        .iter()
        .map(|&p| {
            let index = ((f64::from(p) / 100.0 * sorted.len() as f64).floor() as usize).min(last);
            (
                p,
                Percentile {
                    count: index,
                    value: sorted[index],
                },
            )
        })
        .collect()
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Statistics for one rule across reports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleStats {
    pub name: Option<String>,
    pub count: usize,
    pub totals: Vec<f64>,
    pub scores: Vec<f64>,
    pub percentages: Vec<f64>,
    pub percentiles: BTreeMap<u8, Percentile>,
    pub average_score: f64,
    pub average_percentage: f64,
}

impl RuleStats {
    pub fn from_results(results: &[&RuleResult]) -> Self {
        let percentages: Vec<Option<f64>> = results.iter().map(|r| r.percentage).collect();
        let flat: Vec<f64> = percentages.iter().map(|p| p.unwrap_or(0.0)).collect();
        let scores: Vec<f64> = results.iter().map(|r| r.score).collect();
        Self {
            name: results.first().map(|r| r.name.clone()),
            count: results.len(),
            totals: results.iter().map(|r| r.total).collect(),
            average_score: average(&scores),
            average_percentage: average(&flat),
            percentiles: percentiles(&percentages),
            scores,
            percentages: flat,
        }
    }
}

/// Share of records with a given grade
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeCount {
    pub count: usize,
    pub percentage: f64,
}

/// Statistics over the summaries of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStats {
    pub identifier: Vec<String>,
    pub totals: Vec<f64>,
    pub scores: Vec<f64>,
    pub percentages: Vec<f64>,
    pub grades: Vec<Option<Grade>>,
    pub grade_counts: BTreeMap<Grade, GradeCount>,
    pub percentiles: BTreeMap<u8, Percentile>,
    pub average_percentage: f64,
    pub average_score: f64,
}

/// Batch statistics: overall figures from summaries plus one entry per rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchStats {
    pub count: usize,
    #[serde(flatten)]
    pub overall: Option<OverallStats>,
    pub kpi: BTreeMap<String, RuleStats>,
}

impl BatchStats {
    /// Aggregate `reports`; overall figures are present only when at
    /// least one report carries a summary.
    pub fn from_reports<'r>(reports: impl IntoIterator<Item = &'r Report>) -> Self {
        let reports: Vec<&Report> = reports.into_iter().collect();
        let count = reports.len();

        let mut by_rule: BTreeMap<&str, Vec<&RuleResult>> = BTreeMap::new();
        for report in &reports {
            for (key, result) in &report.results {
                by_rule.entry(key.as_str()).or_default().push(result);
            }
        }
        let kpi = by_rule
            .into_iter()
            .map(|(key, results)| (key.to_string(), RuleStats::from_results(&results)))
            .collect();

        let summaries: Vec<_> = reports.iter().filter_map(|r| r.summary.as_ref()).collect();
        let overall = (!summaries.is_empty()).then(|| {
            let percentages: Vec<Option<f64>> =
                summaries.iter().map(|s| s.totals.percentage).collect();
            let flat: Vec<f64> = percentages.iter().map(|p| p.unwrap_or(0.0)).collect();
            let scores: Vec<f64> = summaries.iter().map(|s| s.totals.score).collect();
            let grades: Vec<Option<Grade>> = summaries.iter().map(|s| s.grade).collect();
            let grade_counts = Grade::ALL
                .iter()
                .map(|&grade| {
                    let n = grades.iter().filter(|g| **g == Some(grade)).count();
                    (
                        grade,
                        GradeCount {
                            count: n,
                            percentage: n as f64 / count as f64 * 100.0,
                        },
                    )
                })
                .collect();

            OverallStats {
                identifier: summaries.iter().map(|s| s.identifier.clone()).collect(),
                totals: summaries.iter().map(|s| s.totals.total).collect(),
                average_percentage: average(&flat),
                average_score: average(&scores),
                percentiles: percentiles(&percentages),
                scores,
                percentages: flat,
                grades,
                grade_counts,
            }
        });

        Self { count, overall, kpi }
    }
}
