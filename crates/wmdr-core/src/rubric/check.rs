//! Check kinds and their evaluation
//!
//! Labels are templates: `{n}` is replaced by the 1-based number of the
//! instance being evaluated, so "deployment number {n} exposure" reads
//! "deployment number 2 exposure" on the second deployment.

use std::collections::BTreeSet;

use tracing::debug;

use super::evaluator::Environment;
use crate::codelist::CodeList;
use crate::document::{reference, text, Node, PathExpr, QName, Record};
use crate::geo::RegionForm;
use crate::validate::{
    is_valid_url, validate, validate_reference, Constraints, Validation, ValueKind,
};

/// Optional code list of time zone ids, checked before the boundary lookup
const TIMEZONE_CODELIST: &str = "TimeZone";

/// One scoring band: more than `above` items earns `points`
#[derive(Debug, Clone, Copy)]
pub struct Band {
    pub above: usize,
    pub points: u8,
    pub comment: Option<&'static str>,
}

impl Band {
    pub const fn new(above: usize, points: u8, comment: Option<&'static str>) -> Self {
        Self {
            above,
            points,
            comment,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Check {
    /// Text of the first match validated as `kind`
    Text {
        path: PathExpr,
        kind: ValueKind,
        label: &'static str,
        min_length: usize,
    },
    /// A code list reference, `xlink:href` unless `attribute` names another
    Reference {
        path: PathExpr,
        attribute: Option<QName>,
        codelist: &'static str,
        label: &'static str,
    },
    Present {
        path: PathExpr,
        label: &'static str,
        found: Option<&'static str>,
    },
    /// One point only when every inner check scores
    AllOf(Vec<Check>),
    /// Length of text that another check already validated; silent when absent
    MinimumLength {
        path: PathExpr,
        min_length: usize,
        message: String,
    },
    RegionMatchesCoordinates {
        path: PathExpr,
        label: &'static str,
    },
    TimezoneMatchesCoordinates {
        path: PathExpr,
        label: &'static str,
    },
    /// Surface cover validated against the list named by its classification scheme
    SurfaceCover {
        scheme: PathExpr,
        cover: PathExpr,
    },
    /// Every link but the last (the facility URL) must be valid
    AdditionalLinks { path: PathExpr },
    DistinctReferenceBands {
        path: PathExpr,
        codelist: &'static str,
        label: &'static str,
        bands: Vec<Band>,
        below: &'static str,
    },
    CountBands {
        path: PathExpr,
        label: &'static str,
        bands: Vec<Band>,
        below: &'static str,
    },
    DistinctReferencesAtLeast {
        path: PathExpr,
        codelist: &'static str,
        label: &'static str,
        minimum: usize,
        shortfall: &'static str,
    },
    /// The context node is an end position within the near-real-time window
    NearRealTime { label: &'static str },
    /// Inner checks apply only when the gate reference names `purpose`
    Gated {
        gate: PathExpr,
        codelist: &'static str,
        label: &'static str,
        purpose: &'static str,
        checks: Vec<Check>,
    },
}

impl Check {
    pub fn text(path: &str, kind: ValueKind, label: &'static str) -> Self {
        Check::Text {
            path: PathExpr::new(path),
            kind,
            label,
            min_length: 1,
        }
    }

    pub fn string(path: &str, label: &'static str) -> Self {
        Self::text(path, ValueKind::String, label)
    }

    pub fn string_min(path: &str, label: &'static str, min_length: usize) -> Self {
        Check::Text {
            path: PathExpr::new(path),
            kind: ValueKind::String,
            label,
            min_length,
        }
    }

    pub fn href(path: &str, codelist: &'static str, label: &'static str) -> Self {
        Check::Reference {
            path: PathExpr::new(path),
            attribute: None,
            codelist,
            label,
        }
    }

    pub fn attribute(
        path: &str,
        attribute: &str,
        codelist: &'static str,
        label: &'static str,
    ) -> Self {
        Check::Reference {
            path: PathExpr::new(path),
            attribute: Some(QName::parse(attribute)),
            codelist,
            label,
        }
    }

    pub fn present(path: &str, label: &'static str) -> Self {
        Check::Present {
            path: PathExpr::new(path),
            label,
            found: None,
        }
    }

    /// Points this check can award
    pub fn weight(&self) -> f64 {
        match self {
            Check::DistinctReferenceBands { bands, .. } | Check::CountBands { bands, .. } => {
                f64::from(bands.iter().map(|band| band.points).max().unwrap_or(0))
            }
            Check::Gated { checks, .. } => checks.iter().map(Check::weight).sum(),
            _ => 1.0,
        }
    }

    pub(crate) fn evaluate(&self, scope: &Scope<'_, '_>) -> CheckOutcome {
        match self {
            Check::Text {
                path,
                kind,
                label,
                min_length,
            } => text_field(scope, path, *kind, label, *min_length),
            Check::Reference {
                path,
                attribute,
                codelist,
                label,
            } => reference_field(scope, path, attribute.as_ref(), codelist, label),
            Check::Present { path, label, found } => presence(scope, path, label, *found),
            Check::AllOf(checks) => all_of(scope, checks),
            Check::MinimumLength {
                path,
                min_length,
                message,
            } => minimum_length(scope, path, *min_length, message),
            Check::RegionMatchesCoordinates { path, label } => region(scope, path, label),
            Check::TimezoneMatchesCoordinates { path, label } => timezone(scope, path, label),
            Check::SurfaceCover { scheme, cover } => surface_cover(scope, scheme, cover),
            Check::AdditionalLinks { path } => additional_links(scope, path),
            Check::DistinctReferenceBands {
                path,
                codelist,
                label,
                bands,
                below,
            } => {
                let matches = scope.locate(path);
                if matches.is_empty() {
                    return Validation::not_found(&scope.label(label)).into();
                }
                let (distinct, mut outcome) = distinct_references(scope, &matches, codelist, label);
                outcome.merge(banded(distinct.len(), bands, below));
                outcome
            }
            Check::CountBands {
                path,
                label,
                bands,
                below,
            } => {
                let matches = scope.locate(path);
                if matches.is_empty() {
                    return Validation::not_found(&scope.label(label)).into();
                }
                banded(matches.len(), bands, below)
            }
            Check::DistinctReferencesAtLeast {
                path,
                codelist,
                label,
                minimum,
                shortfall,
            } => at_least(scope, path, codelist, label, *minimum, shortfall),
            Check::NearRealTime { label } => near_real_time(scope, label),
            Check::Gated {
                gate,
                codelist,
                label,
                purpose,
                checks,
            } => gated(scope, gate, codelist, label, purpose, checks),
        }
    }
}

/// Score and comments produced by one check
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckOutcome {
    pub score: f64,
    pub comments: Vec<String>,
}

impl CheckOutcome {
    pub fn points(score: f64) -> Self {
        Self {
            score,
            comments: Vec::new(),
        }
    }

    pub fn comment(score: f64, comment: impl Into<String>) -> Self {
        Self {
            score,
            comments: vec![comment.into()],
        }
    }

    pub fn merge(&mut self, other: CheckOutcome) {
        self.score += other.score;
        self.comments.extend(other.comments);
    }
}

impl From<Validation> for CheckOutcome {
    fn from(validation: Validation) -> Self {
        Self {
            score: f64::from(validation.score),
            comments: validation.comments,
        }
    }
}

/// Where a check is evaluated: a record, a context node and the instance number
#[derive(Clone, Copy)]
pub(crate) struct Scope<'a, 'input> {
    pub record: &'a Record<'input>,
    pub node: Node<'a, 'input>,
    pub number: usize,
    pub env: &'a Environment,
}

impl<'a, 'input> Scope<'a, 'input> {
    pub fn at(&self, node: Node<'a, 'input>, number: usize) -> Self {
        Self {
            node,
            number,
            ..*self
        }
    }

    pub fn label(&self, template: &str) -> String {
        template.replace("{n}", &self.number.to_string())
    }

    pub fn locate(&self, path: &PathExpr) -> Vec<Node<'a, 'input>> {
        self.record.locate(self.node, path)
    }

    pub fn first(&self, path: &PathExpr) -> Option<Node<'a, 'input>> {
        self.record.first(self.node, path)
    }

    pub fn codelist(&self, name: &str) -> Option<&'a CodeList> {
        let list = self.env.codelists.get(name);
        if list.is_none() {
            debug!(codelist = name, "code list not loaded");
        }
        list
    }
}

fn text_field(
    scope: &Scope<'_, '_>,
    path: &PathExpr,
    kind: ValueKind,
    label: &str,
    min_length: usize,
) -> CheckOutcome {
    let label = scope.label(label);
    let Some(node) = scope.first(path) else {
        return Validation::not_found(&label).into();
    };
    validate(text(node), kind, &label, &Constraints::min_length(min_length)).into()
}

fn reference_field(
    scope: &Scope<'_, '_>,
    path: &PathExpr,
    attribute: Option<&QName>,
    codelist: &str,
    label: &str,
) -> CheckOutcome {
    let label = scope.label(label);
    let Some(node) = scope.first(path) else {
        return Validation::not_found(&label).into();
    };
    let value = match attribute {
        Some(name) => scope.record.attribute(node, name),
        None => reference(node),
    };
    match non_empty(value) {
        Some(value) => validate_reference(value, scope.codelist(codelist), &label).into(),
        None => Validation::href_not_found(&label).into(),
    }
}

fn presence(
    scope: &Scope<'_, '_>,
    path: &PathExpr,
    label: &str,
    found: Option<&str>,
) -> CheckOutcome {
    if scope.first(path).is_none() {
        return Validation::not_found(&scope.label(label)).into();
    }
    match found {
        Some(comment) => CheckOutcome::comment(1.0, scope.label(comment)),
        None => CheckOutcome::points(1.0),
    }
}

fn all_of(scope: &Scope<'_, '_>, checks: &[Check]) -> CheckOutcome {
    let mut combined = CheckOutcome::default();
    let mut passed = true;
    for check in checks {
        let outcome = check.evaluate(scope);
        passed &= outcome.score >= check.weight();
        combined.comments.extend(outcome.comments);
    }
    combined.score = if passed { 1.0 } else { 0.0 };
    combined
}

fn minimum_length(
    scope: &Scope<'_, '_>,
    path: &PathExpr,
    min_length: usize,
    message: &str,
) -> CheckOutcome {
    let Some(value) = scope
        .first(path)
        .and_then(text)
        .map(str::trim)
        .filter(|t| !t.is_empty())
    else {
        return CheckOutcome::default();
    };
    if value.chars().count() < min_length {
        debug!(length = value.chars().count(), min_length, "{}", message);
        return CheckOutcome::comment(0.0, message);
    }
    CheckOutcome::points(1.0)
}

fn region(scope: &Scope<'_, '_>, path: &PathExpr, label: &str) -> CheckOutcome {
    let label = scope.label(label);
    let Some(node) = scope.first(path) else {
        return Validation::not_found(&label).into();
    };

    let (declared, form) = match (non_empty(reference(node)), non_empty(text(node))) {
        (Some(href), _) => (href.to_string(), RegionForm::Uri),
        (None, Some(notation)) => (notation.to_string(), RegionForm::Notation),
        (None, None) => return Validation::not_found(&label).into(),
    };

    let coordinates = match scope.record.coordinates() {
        Ok(coordinates) => coordinates,
        Err(issue) => return CheckOutcome::comment(0.0, issue.to_string()),
    };

    match scope
        .env
        .boundaries
        .region_for(coordinates.lon, coordinates.lat, form)
    {
        Some(found) if found == declared => CheckOutcome::points(1.0),
        found => {
            debug!(declared = %declared, found = ?found, "region mismatch");
            CheckOutcome::comment(0.0, "region doesn't match coordinates")
        }
    }
}

fn timezone(scope: &Scope<'_, '_>, path: &PathExpr, label: &str) -> CheckOutcome {
    let label = scope.label(label);
    let Some(node) = scope.first(path) else {
        return Validation::not_found(&label).into();
    };
    let Some(tzid) = non_empty(reference(node)) else {
        return Validation::href_not_found(&label).into();
    };
    // Without a TimeZone list the boundary dataset is the only authority
    if let Some(list) = scope.codelist(TIMEZONE_CODELIST) {
        let validation = validate_reference(tzid, Some(list), &label);
        if !validation.passed() {
            return validation.into();
        }
    }
    let coordinates = match scope.record.coordinates() {
        Ok(coordinates) => coordinates,
        Err(issue) => return CheckOutcome::comment(0.0, issue.to_string()),
    };

    match scope
        .env
        .boundaries
        .is_within_timezone(coordinates.lon, coordinates.lat, tzid)
    {
        Ok(()) => CheckOutcome::points(1.0),
        Err(err) => CheckOutcome::comment(0.0, err.to_string()),
    }
}

fn surface_cover(scope: &Scope<'_, '_>, scheme: &PathExpr, cover: &PathExpr) -> CheckOutcome {
    const SCHEME: &str = "surface cover classification";
    const COVER: &str = "surface cover";

    let Some(scheme_node) = scope.first(scheme) else {
        return Validation::not_found(SCHEME).into();
    };
    let Some(scheme_href) = non_empty(reference(scheme_node)) else {
        return Validation::href_not_found(SCHEME).into();
    };
    let validation =
        validate_reference(scheme_href, scope.codelist("SurfaceCoverClassification"), SCHEME);
    if !validation.passed() {
        return validation.into();
    }

    let key = last_segment(scheme_href);
    let Some(list) = scope.env.codelists.get(&key) else {
        return CheckOutcome::comment(
            0.0,
            "codelist not found for surface cover classification scheme",
        );
    };

    let Some(cover_node) = scope.first(cover) else {
        return Validation::not_found(COVER).into();
    };
    match non_empty(reference(cover_node)) {
        Some(href) => validate_reference(href, Some(list), COVER).into(),
        None => Validation::href_not_found(COVER).into(),
    }
}

fn additional_links(scope: &Scope<'_, '_>, path: &PathExpr) -> CheckOutcome {
    let links = scope.locate(path);
    let Some((_, others)) = links.split_last().filter(|(_, others)| !others.is_empty()) else {
        return CheckOutcome::comment(0.0, "Other links are missing");
    };
    if others
        .iter()
        .all(|link| text(*link).is_some_and(is_valid_url))
    {
        CheckOutcome::points(1.0)
    } else {
        CheckOutcome::comment(0.0, "At least one of other links is invalid")
    }
}

fn distinct_references(
    scope: &Scope<'_, '_>,
    matches: &[Node<'_, '_>],
    codelist: &str,
    label: &str,
) -> (BTreeSet<String>, CheckOutcome) {
    let label = scope.label(label);
    let list = scope.codelist(codelist);
    let mut distinct = BTreeSet::new();
    let mut outcome = CheckOutcome::default();

    for node in matches {
        let Some(href) = non_empty(reference(*node)) else {
            outcome.comments.push(format!("{} href not found", label));
            continue;
        };
        let validation = validate_reference(href, list, &label);
        if validation.passed() {
            distinct.insert(href.to_string());
        } else {
            outcome.comments.extend(validation.comments);
        }
    }
    (distinct, outcome)
}

fn banded(count: usize, bands: &[Band], below: &str) -> CheckOutcome {
    match bands.iter().find(|band| count > band.above) {
        Some(band) => CheckOutcome {
            score: f64::from(band.points),
            comments: band.comment.map(String::from).into_iter().collect(),
        },
        None => CheckOutcome::comment(0.0, below),
    }
}

fn at_least(
    scope: &Scope<'_, '_>,
    path: &PathExpr,
    codelist: &str,
    label: &str,
    minimum: usize,
    shortfall: &str,
) -> CheckOutcome {
    let matches = scope.locate(path);
    if matches.is_empty() {
        return Validation::not_found(&scope.label(label)).into();
    }
    let (distinct, mut outcome) = distinct_references(scope, &matches, codelist, label);
    if distinct.len() >= minimum {
        outcome.score = 1.0;
    } else {
        outcome.comments.push(shortfall.to_string());
    }
    outcome
}

fn near_real_time(scope: &Scope<'_, '_>, label: &str) -> CheckOutcome {
    let node = scope.node;
    if node.attribute("indeterminatePosition") == Some("now") {
        return CheckOutcome::points(1.0);
    }

    let label = scope.label(label);
    let validation = validate(text(node), ValueKind::DateTime, &label, &Constraints::default());
    let Some(end) = validation.value.as_ref().and_then(|v| v.as_datetime()) else {
        return validation.into();
    };

    let options = &scope.env.options;
    let end = end.with_timezone(&chrono::Utc);
    // No representable cutoff means every end date is recent enough
    let cutoff = options
        .reference_time
        .checked_sub_signed(options.near_real_time_window);
    match cutoff {
        Some(cutoff) if end < cutoff => CheckOutcome::comment(0.0, "deployment is not real time"),
        _ => CheckOutcome::points(1.0),
    }
}

fn gated(
    scope: &Scope<'_, '_>,
    gate: &PathExpr,
    codelist: &str,
    label: &str,
    purpose: &str,
    checks: &[Check],
) -> CheckOutcome {
    let label = scope.label(label);
    let Some(node) = scope.first(gate) else {
        return Validation::not_found(&label).into();
    };
    let Some(href) = non_empty(reference(node)) else {
        return Validation::href_not_found(&label).into();
    };
    let validation = validate_reference(href, scope.codelist(codelist), &label);
    if !validation.passed() {
        return validation.into();
    }
    if last_segment(href) != purpose {
        return CheckOutcome::default();
    }

    let mut combined = CheckOutcome::default();
    for check in checks {
        combined.merge(check.evaluate(scope));
    }
    combined
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Final `/` segment of a code URI, lowercased
fn last_segment(href: &str) -> String {
    href.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(href)
        .to_lowercase()
}
