//! Rule evaluation and instance aggregation

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info};

use super::check::Scope;
use super::{AggregationPolicy, RuleBody, RuleDescriptor, Rubric, Selection, SubRule, Target};
use crate::codelist::CodelistRegistry;
use crate::document::{Node, Record};
use crate::error::Result;
use crate::geo::BoundaryDatasets;
use crate::report::{Report, RuleResult, Summary};
use crate::schema::SchemaVerdict;
use crate::trace_time;

/// Inputs that make an evaluation reproducible
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationOptions {
    /// "Now" for near-real-time checks
    pub reference_time: DateTime<Utc>,
    pub near_real_time_window: TimeDelta,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            reference_time: Utc::now(),
            near_real_time_window: TimeDelta::hours(24),
        }
    }
}

/// Shared, read-only data every check can consult
#[derive(Debug)]
pub(crate) struct Environment {
    pub codelists: Arc<CodelistRegistry>,
    pub boundaries: Arc<BoundaryDatasets>,
    pub options: EvaluationOptions,
}

#[derive(Debug, Default)]
struct Tally {
    total: f64,
    score: f64,
    comments: Vec<String>,
}

impl Tally {
    fn add(&mut self, other: Tally) {
        self.total += other.total;
        self.score += other.score;
        self.comments.extend(other.comments);
    }
}

/// Evaluates records against a rubric
#[derive(Debug)]
pub struct Evaluator {
    rubric: Rubric,
    env: Environment,
}

impl Evaluator {
    pub fn new(
        rubric: Rubric,
        codelists: Arc<CodelistRegistry>,
        boundaries: Arc<BoundaryDatasets>,
    ) -> Self {
        Self {
            rubric,
            env: Environment {
                codelists,
                boundaries,
                options: EvaluationOptions::default(),
            },
        }
    }

    pub fn with_options(mut self, options: EvaluationOptions) -> Self {
        self.env.options = options;
        self
    }

    pub fn rubric(&self) -> &Rubric {
        &self.rubric
    }

    pub fn options(&self) -> &EvaluationOptions {
        &self.env.options
    }

    /// Evaluate `record`.
    ///
    /// `schema` is the verdict for the mandatory rule; `None` means schema
    /// validation was skipped, which drops the mandatory rule from a full
    /// run and keeps the computed grade.
    #[tracing::instrument(skip_all, fields(identifier = %record.identifier(), version = %record.version()))]
    pub fn evaluate(
        &self,
        record: &Record<'_>,
        selection: &Selection,
        schema: Option<&SchemaVerdict>,
    ) -> Result<Report> {
        let start = Instant::now();
        let target = self.rubric.resolve(selection)?;
        let scope = Scope {
            record,
            node: record.root(),
            number: 1,
            env: &self.env,
        };

        let mut results = Vec::new();
        match target {
            Target::All => {
                for rule in self.rubric.rules() {
                    if matches!(rule.body, RuleBody::Mandatory) && schema.is_none() {
                        debug!(rule = rule.key, "schema validation skipped");
                        continue;
                    }
                    results.push((rule.key.to_string(), evaluate_rule(rule, &scope, schema)));
                }
            }
            Target::Rule(rule) => {
                results.push((rule.key.to_string(), evaluate_rule(rule, &scope, schema)));
            }
            Target::SubRule { parent, sub } => {
                results.push((sub.key(), evaluate_selected_sub_rule(parent, sub, &scope)));
            }
        }

        let summary = (results.len() > 1)
            .then(|| Summary::build(&results, record.identifier(), schema.is_none()));
        trace_time!(start, "evaluate_record", rules = results.len());

        Ok(Report { results, summary })
    }
}

fn evaluate_rule(
    rule: &RuleDescriptor,
    scope: &Scope<'_, '_>,
    schema: Option<&SchemaVerdict>,
) -> RuleResult {
    let result = match &rule.body {
        RuleBody::Mandatory => mandatory(rule.name, schema),
        RuleBody::Pending => RuleResult::new(rule.name, 0.0, 0.0, vec!["not implemented".to_string()]),
        RuleBody::Checks(rules) => {
            let mut tally = Tally::default();
            for sub in rules {
                tally.add(evaluate_sub_rule(sub, scope).0);
            }
            finish(rule.name, tally)
        }
        RuleBody::Instances {
            instances,
            policy,
            rules,
        } => {
            let nodes = scope.locate(&instances.path);
            let (tally, count) = aggregate(
                *policy,
                rule.declared_total(),
                instances.element,
                nodes,
                scope,
                |instance| {
                    let mut tally = Tally::default();
                    for sub in rules {
                        tally.add(evaluate_sub_rule(sub, instance).0);
                    }
                    tally
                },
            );
            finish(rule.name, tally).with_instances(count)
        }
    };

    info!(
        rule = rule.key,
        total = result.total,
        score = result.score,
        percentage = ?result.percentage,
        "evaluated"
    );
    result
}

fn mandatory(name: &str, schema: Option<&SchemaVerdict>) -> RuleResult {
    match schema {
        Some(verdict) if verdict.valid => RuleResult::new(name, 1.0, 1.0, Vec::new()),
        Some(verdict) if verdict.errors.is_empty() => {
            RuleResult::new(name, 1.0, 0.0, vec!["record is not schema compliant".to_string()])
        }
        Some(verdict) => RuleResult::new(name, 1.0, 0.0, verdict.errors.clone()),
        None => RuleResult::new(name, 1.0, 0.0, vec!["schema validation skipped".to_string()]),
    }
}

/// Sub-rule picked by id: evaluated alone, under its parent's instances if any
fn evaluate_selected_sub_rule(
    parent: &RuleDescriptor,
    sub: &SubRule,
    scope: &Scope<'_, '_>,
) -> RuleResult {
    match &parent.body {
        RuleBody::Instances {
            instances, policy, ..
        } => {
            let nodes = scope.locate(&instances.path);
            let (tally, count) = aggregate(*policy, sub.total, instances.element, nodes, scope, |instance| {
                evaluate_sub_rule(sub, instance).0
            });
            finish(&sub.display_name(), tally).with_instances(count)
        }
        _ => {
            let (tally, count) = evaluate_sub_rule(sub, scope);
            let result = finish(&sub.display_name(), tally);
            match count {
                Some(count) => result.with_instances(count),
                None => result,
            }
        }
    }
}

/// Tally of one sub-rule and, for repeated sub-rules, the instance count
fn evaluate_sub_rule(sub: &SubRule, scope: &Scope<'_, '_>) -> (Tally, Option<usize>) {
    let Some(instances) = &sub.instances else {
        return (run_checks(sub, scope), None);
    };

    let nodes = scope.locate(&instances.path);
    let (tally, count) = aggregate(sub.policy, sub.total, instances.element, nodes, scope, |instance| {
        run_checks(sub, instance)
    });
    debug!(sub_rule = sub.code, instances = count, score = tally.score, "aggregated");
    (tally, Some(count))
}

fn run_checks(sub: &SubRule, scope: &Scope<'_, '_>) -> Tally {
    let mut score = 0.0;
    let mut comments = Vec::new();
    for check in &sub.checks {
        let outcome = check.evaluate(scope);
        score += outcome.score.min(check.weight());
        comments.extend(outcome.comments);
    }
    Tally {
        total: sub.total,
        score: score.clamp(0.0, sub.total),
        comments,
    }
}

/// Combine per-instance tallies by `policy`
fn aggregate<'a, 'input>(
    policy: AggregationPolicy,
    declared_total: f64,
    element: &str,
    nodes: Vec<Node<'a, 'input>>,
    scope: &Scope<'a, 'input>,
    mut each: impl FnMut(&Scope<'a, 'input>) -> Tally,
) -> (Tally, usize) {
    let count = nodes.len();
    if count == 0 {
        debug!(element, "no instances");
        let total = match policy {
            AggregationPolicy::PerInstanceAdditive => 0.0,
            _ => declared_total,
        };
        return (
            Tally {
                total,
                score: 0.0,
                comments: vec![format!("{} not found", element)],
            },
            0,
        );
    }

    let considered = match policy {
        AggregationPolicy::Single => &nodes[..1],
        _ => &nodes[..],
    };
    let mut tally = Tally::default();
    for (index, node) in considered.iter().enumerate() {
        tally.add(each(&scope.at(*node, index + 1)));
    }

    if policy == AggregationPolicy::AverageOverInstances {
        let n = considered.len() as f64;
        tally.total /= n;
        tally.score /= n;
    }
    (tally, count)
}

fn finish(name: &str, tally: Tally) -> RuleResult {
    RuleResult::new(name, tally.total, tally.score.clamp(0.0, tally.total), tally.comments)
}
