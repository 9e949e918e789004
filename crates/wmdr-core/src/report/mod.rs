//! Evaluation reports, summaries and grades

pub mod group;

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Result, WmdrError};

pub use group::GroupedReport;

/// Key of the mandatory (schema compliance) rule
pub const MANDATORY_RULE: &str = "kpi_10";

/// Result of one rule or sub-rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub name: String,
    pub total: f64,
    pub score: f64,
    pub comments: Vec<String>,
    pub percentage: Option<f64>,
    #[serde(
        rename = "instanceCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub instance_count: Option<usize>,
}

impl RuleResult {
    pub fn new(name: impl Into<String>, total: f64, score: f64, comments: Vec<String>) -> Self {
        Self {
            name: name.into(),
            total,
            score,
            comments,
            percentage: percentage(total, score),
            instance_count: None,
        }
    }

    pub fn with_instances(mut self, count: usize) -> Self {
        self.instance_count = Some(count);
        self
    }
}

/// Letter grade of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
    F,
    /// Not schema compliant
    U,
}

impl Grade {
    pub const ALL: [Grade; 7] = [Grade::A, Grade::B, Grade::C, Grade::D, Grade::E, Grade::F, Grade::U];

    /// Band a percentage; `None` when there is nothing to grade
    pub fn from_percentage(percentage: Option<f64>) -> Option<Grade> {
        let p = percentage?;
        Some(if p >= 80.0 {
            Grade::A
        } else if p >= 65.0 {
            Grade::B
        } else if p >= 50.0 {
            Grade::C
        } else if p >= 35.0 {
            Grade::D
        } else if p >= 20.0 {
            Grade::E
        } else {
            Grade::F
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
            Grade::F => "F",
            Grade::U => "U",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sums over a set of rule results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total: f64,
    pub score: f64,
    pub percentage: Option<f64>,
    /// Comments of every rule that has any
    pub comments: BTreeMap<String, Vec<String>>,
}

impl Totals {
    pub fn from_results<'r>(results: impl IntoIterator<Item = (&'r str, &'r RuleResult)>) -> Self {
        let mut total = 0.0;
        let mut score = 0.0;
        let mut comments = BTreeMap::new();
        for (key, result) in results {
            total += result.total;
            score += result.score;
            if !result.comments.is_empty() {
                comments.insert(key.to_string(), result.comments.clone());
            }
        }
        Self {
            total,
            score,
            percentage: percentage(total, score),
            comments,
        }
    }
}

/// Record-level summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(flatten)]
    pub totals: Totals,
    pub identifier: String,
    pub grade: Option<Grade>,
}

impl Summary {
    /// Summarize `results`; the grade is `U` unless the mandatory rule
    /// scored 100 % or schema validation was explicitly skipped.
    pub fn build(results: &[(String, RuleResult)], identifier: String, schema_skipped: bool) -> Self {
        let totals = Totals::from_results(results.iter().map(|(k, r)| (k.as_str(), r)));
        let compliant = schema_skipped
            || results
                .iter()
                .find(|(key, _)| key == MANDATORY_RULE)
                .is_some_and(|(_, result)| result.percentage == Some(100.0));
        let grade = if compliant {
            Grade::from_percentage(totals.percentage)
        } else {
            Some(Grade::U)
        };
        Self {
            totals,
            identifier,
            grade,
        }
    }
}

/// Results of evaluating one record, in rule order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Report {
    pub results: Vec<(String, RuleResult)>,
    pub summary: Option<Summary>,
}

impl Report {
    pub fn get(&self, key: &str) -> Option<&RuleResult> {
        self.results
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, result)| result)
    }

    pub fn identifier(&self) -> Option<&str> {
        self.summary.as_ref().map(|s| s.identifier.as_str())
    }

    /// Read a report previously written as JSON
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = value else {
            return Err(WmdrError::invalid_value("report", "expected a JSON object"));
        };

        let mut report = Report::default();
        for (key, value) in map {
            if key == "summary" {
                report.summary = Some(serde_json::from_value(value)?);
            } else {
                report.results.push((key, serde_json::from_value(value)?));
            }
        }
        Ok(report)
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = self.results.len() + usize::from(self.summary.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (key, result) in &self.results {
            map.serialize_entry(key, result)?;
        }
        if let Some(summary) = &self.summary {
            map.serialize_entry("summary", summary)?;
        }
        map.end()
    }
}

/// Percentage rounded to three decimals, `None` for a zero total
pub fn percentage(total: f64, score: f64) -> Option<f64> {
    if total > 0.0 {
        Some(round3(score / total * 100.0))
    } else {
        None
    }
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
