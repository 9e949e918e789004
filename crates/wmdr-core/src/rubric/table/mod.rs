//! The standard WMO KPI rubric as data
//!
//! Rules appear in report order. Paths are relative to the record root for
//! station-level rules and relative to the instance for instance rules.

mod contacts;
mod data_generation;
mod deployment;
mod station;
mod value;

use super::{AggregationPolicy, Category, Check, InstanceSpec, RuleBody, RuleDescriptor, SubRule};
use crate::validate::ValueKind;

pub(crate) const FACILITY: &str = "./wmdr:facility/wmdr:ObservingFacility";
pub(crate) const OBSERVATION: &str = "./wmdr:facility/wmdr:ObservingFacility/wmdr:observation/wmdr:ObservingCapability/wmdr:observation/om:OM_Observation";

/// Thresholds the rubric takes from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubricSettings {
    pub site_description_min_length: usize,
    pub event_description_min_length: usize,
    pub procedure_description_min_length: usize,
}

impl Default for RubricSettings {
    fn default() -> Self {
        Self {
            site_description_min_length: 300,
            event_description_min_length: 100,
            procedure_description_min_length: 50,
        }
    }
}

/// Every rule of the rubric, in report order
pub fn standard_rules(settings: &RubricSettings) -> Vec<RuleDescriptor> {
    vec![
        RuleDescriptor {
            key: "kpi_10",
            name: "KPI-1: WMDR Compliance",
            category: None,
            body: RuleBody::Mandatory,
        },
        RuleDescriptor {
            key: "kpi_20",
            name: "KPI-2-0: station characteristics",
            category: Some(Category::StationCharacteristics),
            body: RuleBody::Checks(station::sub_rules(settings)),
        },
        pending("kpi_21", "KPI-2-1: station characteristics (OSCAR/Surface)", Some(Category::StationCharacteristics)),
        RuleDescriptor {
            key: "kpi_30",
            name: "KPI-3-0: Observations/measurements - Basic information",
            category: Some(Category::ObservationsMeasurements),
            body: RuleBody::Instances {
                instances: InstanceSpec::new(OBSERVATION, "OM_Observation"),
                policy: AggregationPolicy::PerInstanceAdditive,
                rules: observation_basics(),
            },
        },
        RuleDescriptor {
            key: "kpi_31",
            name: "KPI-3-1: Deployment",
            category: Some(Category::ObservationsMeasurements),
            body: RuleBody::Instances {
                instances: InstanceSpec::new(OBSERVATION, "OM_Observation"),
                policy: AggregationPolicy::AverageOverInstances,
                rules: deployment::sub_rules(),
            },
        },
        pending("kpi_32", "KPI-3-2: Deployment (OSCAR/Surface)", Some(Category::ObservationsMeasurements)),
        RuleDescriptor {
            key: "kpi_33",
            name: "KPI-3-3: Data generation",
            category: Some(Category::ObservationsMeasurements),
            body: RuleBody::Instances {
                instances: InstanceSpec::new(
                    &format!("{}/{}", OBSERVATION, data_generation::INSTANCE_PATH),
                    "DataGeneration",
                ),
                policy: AggregationPolicy::AverageOverInstances,
                rules: data_generation::sub_rules(settings),
            },
        },
        pending("kpi_34", "KPI-3-4: Data generation (OSCAR/Surface)", Some(Category::ObservationsMeasurements)),
        contacts::station_contacts(),
        contacts::individual_contacts(),
        pending("kpi_50", "KPI-5-0: Bibliographic references and Documents (OSCAR/Surface)", None),
        RuleDescriptor {
            key: "kpi_60",
            name: "KPI-6-0: Value of a station for WIGOS",
            category: None,
            body: RuleBody::Checks(value::sub_rules()),
        },
    ]
}

fn pending(key: &'static str, name: &'static str, category: Option<Category>) -> RuleDescriptor {
    RuleDescriptor {
        key,
        name,
        category,
        body: RuleBody::Pending,
    }
}

fn observation_basics() -> Vec<SubRule> {
    vec![
        SubRule::new(
            "3-0-00",
            "Geometry",
            vec![Check::href("./om:type", "Geometry", "observation number {n} geometry")],
        ),
        SubRule::new(
            "3-0-01",
            "Deployments",
            vec![Check::present(
                "./om:procedure/wmdr:Process/wmdr:deployment",
                "observation number {n} deployment",
            )],
        ),
    ]
}

/// Begin position of a `validPeriod` under `parent`
pub(crate) fn valid_period(parent: &str, label: &'static str) -> Check {
    Check::text(
        &format!("{}/wmdr:validPeriod/gml:TimePeriod/gml:beginPosition", parent),
        ValueKind::DateTime,
        label,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rule_keys_in_report_order() {
        let keys: Vec<&str> = standard_rules(&RubricSettings::default())
            .iter()
            .map(|rule| rule.key)
            .collect();
        assert_eq!(
            keys,
            vec![
                "kpi_10", "kpi_20", "kpi_21", "kpi_30", "kpi_31", "kpi_32", "kpi_33", "kpi_34",
                "kpi_40", "kpi_41", "kpi_50", "kpi_60"
            ]
        );
    }

    #[test]
    fn test_sub_rule_codes_are_unique() {
        let rules = standard_rules(&RubricSettings::default());
        let mut seen = HashSet::new();
        for rule in &rules {
            for sub in rule.sub_rules() {
                assert!(seen.insert(sub.code), "duplicate sub-rule {}", sub.code);
                assert_eq!(sub.total, sub.weight(), "total of {} differs from its checks", sub.code);
            }
        }
        assert!(seen.contains("2-0-13"));
        assert!(seen.contains("3-1-27"));
        assert!(seen.contains("3-3-27"));
        assert!(!seen.contains("3-1-10"));
    }

    #[test]
    fn test_station_sub_rule_totals() {
        let rules = standard_rules(&RubricSettings::default());
        let station = &rules[1];
        let totals: Vec<(&str, f64)> = station
            .sub_rules()
            .iter()
            .map(|sub| (sub.code, sub.total))
            .collect();
        assert_eq!(totals[0], ("2-0-00", 2.0));
        assert_eq!(totals[1], ("2-0-01", 1.0));
        assert_eq!(totals[10], ("2-0-10", 5.0));
        assert_eq!(totals[12], ("2-0-12", 5.0));
        assert_eq!(totals.len(), 14);
    }

    #[test]
    fn test_settings_flow_into_checks() {
        let settings = RubricSettings {
            site_description_min_length: 10,
            ..RubricSettings::default()
        };
        let rules = standard_rules(&settings);
        let site = rules[1]
            .sub_rules()
            .iter()
            .find(|sub| sub.code == "2-0-06")
            .unwrap();
        let has_message = site.checks.iter().any(|check| {
            matches!(check, Check::MinimumLength { min_length: 10, message, .. } if message.contains("(10 chars)"))
        });
        assert!(has_message);
    }
}
