//! The KPI rubric: a static, typed table of rules.
//!
//! A rule is reported under `kpi_NN` and has one of four bodies. Sub-rules
//! are addressed by their dashed code (`2-0-00`) and reported under
//! `kpi_NNNN`. All bespoke rubric logic lives in a handful of [`Check`]
//! variants; the table itself is pure data (see [`table`]).

pub mod check;
pub mod evaluator;
pub mod table;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::PathExpr;
use crate::error::{Result, WmdrError};
pub use check::{Band, Check, CheckOutcome};
pub use evaluator::{EvaluationOptions, Evaluator};

/// How instances of a repeated structure combine into one score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationPolicy {
    /// Only the first instance counts
    Single,
    /// Scores averaged over instances; declared total stays fixed
    #[default]
    AverageOverInstances,
    /// Every instance adds its own points to the total
    PerInstanceAdditive,
}

impl AggregationPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregationPolicy::Single => "single",
            AggregationPolicy::AverageOverInstances => "average-over-instances",
            AggregationPolicy::PerInstanceAdditive => "per-instance-additive",
        }
    }
}

impl fmt::Display for AggregationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report grouping for category summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    StationCharacteristics,
    ObservationsMeasurements,
    StationContacts,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::StationCharacteristics,
        Category::ObservationsMeasurements,
        Category::StationContacts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::StationCharacteristics => "station_characteristics",
            Category::ObservationsMeasurements => "observations_measurements",
            Category::StationContacts => "station_contacts",
        }
    }
}

/// A repeated structure evaluated once per occurrence
#[derive(Debug, Clone)]
pub struct InstanceSpec {
    pub path: PathExpr,
    /// Element label used in "<element> not found"
    pub element: &'static str,
}

impl InstanceSpec {
    pub fn new(path: &str, element: &'static str) -> Self {
        Self {
            path: PathExpr::new(path),
            element,
        }
    }
}

/// A scored item inside a rule, e.g. `2-0-06`
#[derive(Debug, Clone)]
pub struct SubRule {
    pub code: &'static str,
    pub name: &'static str,
    pub total: f64,
    pub policy: AggregationPolicy,
    /// When set, `checks` run once per instance and combine by `policy`
    pub instances: Option<InstanceSpec>,
    pub checks: Vec<Check>,
}

impl SubRule {
    /// A sub-rule whose total is the combined weight of its checks
    pub fn new(code: &'static str, name: &'static str, checks: Vec<Check>) -> Self {
        let total = checks.iter().map(Check::weight).sum();
        Self {
            code,
            name,
            total,
            policy: AggregationPolicy::Single,
            instances: None,
            checks,
        }
    }

    /// Average the checks over every match of `path`
    pub fn over_instances(mut self, path: &str, element: &'static str) -> Self {
        self.policy = AggregationPolicy::AverageOverInstances;
        self.instances = Some(InstanceSpec::new(path, element));
        self
    }

    /// Report id, `2-0-06` becomes `kpi_2006`
    pub fn key(&self) -> String {
        format!("kpi_{}", digits(self.code))
    }

    pub fn display_name(&self) -> String {
        format!("KPI-{}: {}", self.code, self.name)
    }

    /// Combined weight of the checks for one instance
    pub fn weight(&self) -> f64 {
        self.checks.iter().map(Check::weight).sum()
    }
}

/// What a rule scores
#[derive(Debug, Clone)]
pub enum RuleBody {
    /// Schema compliance from a supplied verdict
    Mandatory,
    /// Sub-rules evaluated once against the record
    Checks(Vec<SubRule>),
    /// Sub-rules evaluated per instance of a repeated structure
    Instances {
        instances: InstanceSpec,
        policy: AggregationPolicy,
        rules: Vec<SubRule>,
    },
    /// Defined in the rubric but not computable from a record
    Pending,
}

/// One top-level KPI
#[derive(Debug, Clone)]
pub struct RuleDescriptor {
    pub key: &'static str,
    pub name: &'static str,
    pub category: Option<Category>,
    pub body: RuleBody,
}

impl RuleDescriptor {
    pub fn sub_rules(&self) -> &[SubRule] {
        match &self.body {
            RuleBody::Checks(rules) | RuleBody::Instances { rules, .. } => rules,
            RuleBody::Mandatory | RuleBody::Pending => &[],
        }
    }

    /// Total before any instances are counted
    pub fn declared_total(&self) -> f64 {
        match &self.body {
            RuleBody::Mandatory => 1.0,
            RuleBody::Pending => 0.0,
            RuleBody::Checks(rules) | RuleBody::Instances { rules, .. } => {
                rules.iter().map(|rule| rule.total).sum()
            }
        }
    }

    pub fn policy(&self) -> Option<AggregationPolicy> {
        match &self.body {
            RuleBody::Instances { policy, .. } => Some(*policy),
            _ => None,
        }
    }

    pub fn body_kind(&self) -> &'static str {
        match &self.body {
            RuleBody::Mandatory => "mandatory",
            RuleBody::Checks(_) => "checks",
            RuleBody::Instances { .. } => "instances",
            RuleBody::Pending => "pending",
        }
    }
}

/// Which rules an evaluation runs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    /// A rule or sub-rule id in any accepted form (`20`, `kpi_20`, `2-0-00`)
    Rule(String),
}

impl Selection {
    pub fn parse(id: Option<&str>) -> Self {
        match id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => Selection::Rule(id.to_string()),
            None => Selection::All,
        }
    }
}

/// Resolved selection
#[derive(Debug, Clone, Copy)]
pub enum Target<'r> {
    All,
    Rule(&'r RuleDescriptor),
    SubRule {
        parent: &'r RuleDescriptor,
        sub: &'r SubRule,
    },
}

/// The ordered rule table
#[derive(Debug, Clone)]
pub struct Rubric {
    rules: Vec<RuleDescriptor>,
}

impl Rubric {
    pub fn new(rules: Vec<RuleDescriptor>) -> Self {
        Self { rules }
    }

    /// The WMO KPI rubric
    pub fn standard(settings: &table::RubricSettings) -> Self {
        Self::new(table::standard_rules(settings))
    }

    pub fn rules(&self) -> &[RuleDescriptor] {
        &self.rules
    }

    pub fn rule(&self, key: &str) -> Option<&RuleDescriptor> {
        self.rules.iter().find(|rule| rule.key == key)
    }

    pub fn category_of(&self, key: &str) -> Option<Category> {
        self.rule(key).and_then(|rule| rule.category)
    }

    /// Resolve a selection against the table
    pub fn resolve(&self, selection: &Selection) -> Result<Target<'_>> {
        let Selection::Rule(id) = selection else {
            return Ok(Target::All);
        };
        let wanted = normalize_id(id);

        if !wanted.is_empty() {
            for rule in &self.rules {
                if digits(rule.key) == wanted {
                    return Ok(Target::Rule(rule));
                }
                if let Some(sub) = rule.sub_rules().iter().find(|s| digits(s.code) == wanted) {
                    return Ok(Target::SubRule { parent: rule, sub });
                }
            }
        }

        Err(WmdrError::UnknownRule {
            id: id.clone(),
            known: self.known_ids(),
        })
    }

    /// Replace aggregation policies by rule or sub-rule id
    pub fn with_policy_overrides(
        mut self,
        overrides: &BTreeMap<String, AggregationPolicy>,
    ) -> Result<Self> {
        for (id, policy) in overrides {
            let wanted = normalize_id(id);
            if !self.apply_policy(&wanted, *policy) {
                return Err(WmdrError::UnknownRule {
                    id: id.clone(),
                    known: self.known_ids(),
                });
            }
        }
        Ok(self)
    }

    fn apply_policy(&mut self, wanted: &str, new_policy: AggregationPolicy) -> bool {
        for rule in &mut self.rules {
            let is_rule = digits(rule.key) == wanted;
            match &mut rule.body {
                RuleBody::Instances { policy, .. } if is_rule => {
                    *policy = new_policy;
                    return true;
                }
                RuleBody::Checks(rules) | RuleBody::Instances { rules, .. } => {
                    if let Some(sub) = rules
                        .iter_mut()
                        .find(|s| s.instances.is_some() && digits(s.code) == wanted)
                    {
                        sub.policy = new_policy;
                        return true;
                    }
                }
                _ => {}
            }
        }
        false
    }

    fn known_ids(&self) -> String {
        self.rules
            .iter()
            .map(|rule| rule.key)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn digits(id: &str) -> String {
    id.chars().filter(char::is_ascii_digit).collect()
}

/// `kpi_2000`, `2-0-00`, `2000` all normalize to `2000`
fn normalize_id(id: &str) -> String {
    let trimmed = id.trim();
    let bare = trimmed
        .strip_prefix("kpi_")
        .or_else(|| trimmed.strip_prefix("KPI-"))
        .unwrap_or(trimmed);
    if bare.is_empty() || !bare.chars().all(|c| c.is_ascii_digit() || c == '-') {
        return String::new();
    }
    digits(bare)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rubric() -> Rubric {
        Rubric::standard(&table::RubricSettings::default())
    }

    #[test]
    fn test_resolve_accepts_all_id_forms() {
        let rubric = rubric();
        for id in ["20", "kpi_20"] {
            match rubric.resolve(&Selection::Rule(id.into())).unwrap() {
                Target::Rule(rule) => assert_eq!(rule.key, "kpi_20"),
                other => panic!("unexpected target {:?}", other),
            }
        }
        for id in ["2000", "kpi_2000", "2-0-00"] {
            match rubric.resolve(&Selection::Rule(id.into())).unwrap() {
                Target::SubRule { parent, sub } => {
                    assert_eq!(parent.key, "kpi_20");
                    assert_eq!(sub.code, "2-0-00");
                }
                other => panic!("unexpected target {:?}", other),
            }
        }
    }

    #[test]
    fn test_resolve_unknown_rule() {
        let err = rubric()
            .resolve(&Selection::Rule("kpi_99".into()))
            .unwrap_err();
        assert!(matches!(err, WmdrError::UnknownRule { .. }));
        assert!(err.to_string().contains("kpi_10"));

        assert!(rubric().resolve(&Selection::Rule("abc".into())).is_err());
    }

    #[test]
    fn test_selection_parse() {
        assert_eq!(Selection::parse(None), Selection::All);
        assert_eq!(Selection::parse(Some("  ")), Selection::All);
        assert_eq!(Selection::parse(Some("kpi_31")), Selection::Rule("kpi_31".into()));
    }

    #[test]
    fn test_declared_totals() {
        let rubric = rubric();
        let total = |key: &str| rubric.rule(key).unwrap().declared_total();
        assert_eq!(total("kpi_10"), 1.0);
        assert_eq!(total("kpi_20"), 32.0);
        assert_eq!(total("kpi_21"), 0.0);
        assert_eq!(total("kpi_30"), 2.0);
        assert_eq!(total("kpi_31"), 37.0);
        assert_eq!(total("kpi_33"), 25.0);
        assert_eq!(total("kpi_40"), 1.0);
        assert_eq!(total("kpi_41"), 5.0);
        assert_eq!(total("kpi_60"), 8.0);
    }

    #[test]
    fn test_policy_override() {
        let mut overrides = BTreeMap::new();
        overrides.insert("kpi_31".to_string(), AggregationPolicy::Single);
        overrides.insert("2-0-12".to_string(), AggregationPolicy::PerInstanceAdditive);
        let rubric = rubric().with_policy_overrides(&overrides).unwrap();

        assert_eq!(rubric.rule("kpi_31").unwrap().policy(), Some(AggregationPolicy::Single));
        let logbook = rubric
            .rule("kpi_20")
            .unwrap()
            .sub_rules()
            .iter()
            .find(|s| s.code == "2-0-12")
            .unwrap();
        assert_eq!(logbook.policy, AggregationPolicy::PerInstanceAdditive);
    }

    #[test]
    fn test_policy_override_requires_instances() {
        let mut overrides = BTreeMap::new();
        overrides.insert("2-0-04".to_string(), AggregationPolicy::Single);
        assert!(rubric().with_policy_overrides(&overrides).is_err());
    }

    #[test]
    fn test_sub_rule_key_and_name() {
        let rubric = rubric();
        let sub = &rubric.rule("kpi_20").unwrap().sub_rules()[6];
        assert_eq!(sub.key(), "kpi_2006");
        assert_eq!(sub.display_name(), "KPI-2-0-06: Site description");
    }

    #[test]
    fn test_policy_serde_kebab_case() {
        let policy: AggregationPolicy = serde_json::from_str("\"per-instance-additive\"").unwrap();
        assert_eq!(policy, AggregationPolicy::PerInstanceAdditive);
        assert_eq!(AggregationPolicy::AverageOverInstances.to_string(), "average-over-instances");
    }
}
