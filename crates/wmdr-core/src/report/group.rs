//! Category grouping of a full report

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::{Report, RuleResult, Summary, Totals};
use crate::rubric::{Category, Rubric};

/// Rule results of one category with their own totals
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryReport {
    pub category: Category,
    pub results: Vec<(String, RuleResult)>,
    pub summary: Totals,
}

impl Serialize for CategoryReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.results.len() + 1))?;
        for (key, result) in &self.results {
            map.serialize_entry(key, result)?;
        }
        map.serialize_entry("summary", &self.summary)?;
        map.end()
    }
}

/// A report split by category, overall summary kept as-is
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedReport {
    pub categories: Vec<CategoryReport>,
    pub summary: Option<Summary>,
}

impl GroupedReport {
    /// Group `report` by the categories `rubric` assigns; rules without a
    /// category only contribute to the overall summary.
    pub fn from_report(report: &Report, rubric: &Rubric) -> Self {
        let categories = Category::ALL
            .iter()
            .map(|category| {
                let results: Vec<(String, RuleResult)> = report
                    .results
                    .iter()
                    .filter(|(key, _)| rubric.category_of(key) == Some(*category))
                    .cloned()
                    .collect();
                let summary = Totals::from_results(results.iter().map(|(k, r)| (k.as_str(), r)));
                CategoryReport {
                    category: *category,
                    results,
                    summary,
                }
            })
            .collect();

        Self {
            categories,
            summary: report.summary.clone(),
        }
    }
}

impl Serialize for GroupedReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.categories.len() + usize::from(self.summary.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for category in &self.categories {
            map.serialize_entry(category.category.as_str(), category)?;
        }
        if let Some(summary) = &self.summary {
            map.serialize_entry("summary", summary)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::table::RubricSettings;

    #[test]
    fn test_group_by_category() {
        let rubric = Rubric::standard(&RubricSettings::default());
        let result = |total: f64, score: f64| RuleResult::new("r", total, score, Vec::new());
        let report = Report {
            results: vec![
                ("kpi_10".to_string(), result(1.0, 1.0)),
                ("kpi_20".to_string(), result(32.0, 16.0)),
                ("kpi_21".to_string(), result(0.0, 0.0)),
                ("kpi_31".to_string(), result(37.0, 37.0)),
                ("kpi_41".to_string(), result(5.0, 1.0)),
                ("kpi_60".to_string(), result(8.0, 2.0)),
            ],
            summary: None,
        };

        let grouped = GroupedReport::from_report(&report, &rubric);
        assert_eq!(grouped.categories.len(), 3);

        let station = &grouped.categories[0];
        assert_eq!(station.category, Category::StationCharacteristics);
        assert_eq!(station.results.len(), 2);
        assert_eq!(station.summary.percentage, Some(50.0));

        let json = serde_json::to_value(&grouped).unwrap();
        assert!(json["observations_measurements"]["kpi_31"].is_object());
        assert_eq!(json["station_contacts"]["summary"]["total"], 5.0);
        assert!(json.get("summary").is_none());
    }
}
