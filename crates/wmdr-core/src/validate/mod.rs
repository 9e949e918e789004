//! Field validators
//!
//! Every validator is pure and soft-failing: it returns a [`Validation`]
//! with a score of 0 or 1, the comments explaining a failure, and the parsed
//! value on success. Absence of the element is the caller's concern (see
//! [`Validation::not_found`]).

pub mod temporal;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::{Host, Url};

use crate::codelist::CodeList;
pub use temporal::{is_valid_duration, parse_datetime};

/// Kind of value a field must hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Integer,
    Float,
    String,
    Url,
    DateTime,
    Duration,
    Href,
}

/// Parsed field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    DateTime(DateTime<FixedOffset>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

/// Outcome of validating one field
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub score: u8,
    pub comments: Vec<String>,
    pub value: Option<Value>,
}

impl Validation {
    pub fn pass(element: &str, value: Value) -> Self {
        debug!(element, value = ?value, "found");
        Self {
            score: 1,
            comments: Vec::new(),
            value: Some(value),
        }
    }

    pub fn fail(comment: String) -> Self {
        debug!("{}", comment);
        Self {
            score: 0,
            comments: vec![comment],
            value: None,
        }
    }

    /// No element matched the field's path
    pub fn not_found(element: &str) -> Self {
        Self::fail(format!("{} not found", element))
    }

    /// The element exists but lacks its reference attribute
    pub fn href_not_found(element: &str) -> Self {
        Self::fail(format!("{} href not found", element))
    }

    pub fn passed(&self) -> bool {
        self.score > 0
    }
}

/// Optional constraints for text validation
#[derive(Debug, Clone, Copy)]
pub struct Constraints<'c> {
    pub min_length: usize,
    pub codelist: Option<&'c CodeList>,
}

impl Default for Constraints<'_> {
    fn default() -> Self {
        Self {
            min_length: 1,
            codelist: None,
        }
    }
}

impl<'c> Constraints<'c> {
    pub fn min_length(min_length: usize) -> Self {
        Self {
            min_length,
            ..Self::default()
        }
    }

    pub fn codelist(codelist: Option<&'c CodeList>) -> Self {
        Self {
            codelist,
            ..Self::default()
        }
    }
}

/// Validate element text as `kind`
pub fn validate(
    raw: Option<&str>,
    kind: ValueKind,
    element: &str,
    constraints: &Constraints<'_>,
) -> Validation {
    match kind {
        ValueKind::Integer => match raw.map(str::trim).and_then(|t| t.parse::<i64>().ok()) {
            Some(n) => Validation::pass(element, Value::Integer(n)),
            None => Validation::fail(format!("{} is not a valid integer", element)),
        },
        ValueKind::Float => match raw
            .map(str::trim)
            .and_then(|t| t.parse::<f64>().ok())
            .filter(|n| n.is_finite())
        {
            Some(n) => Validation::pass(element, Value::Float(n)),
            None => Validation::fail(format!("{} is not a valid number", element)),
        },
        ValueKind::String => validate_string(raw, element, constraints),
        ValueKind::Url => match raw.map(str::trim) {
            Some(candidate) if is_valid_url(candidate) => {
                Validation::pass(element, Value::Text(candidate.to_string()))
            }
            _ => Validation::fail(format!("{} is not a valid URL", element)),
        },
        ValueKind::DateTime => match raw.and_then(parse_datetime) {
            Some(dt) => Validation::pass(element, Value::DateTime(dt)),
            None => Validation::fail(format!("{} is not a valid date", element)),
        },
        ValueKind::Duration => match raw.map(str::trim) {
            Some(candidate) if is_valid_duration(candidate) => {
                Validation::pass(element, Value::Text(candidate.to_string()))
            }
            _ => Validation::fail(format!("{} is not a valid duration", element)),
        },
        ValueKind::Href => validate_reference(raw.unwrap_or(""), constraints.codelist, element),
    }
}

fn validate_string(raw: Option<&str>, element: &str, constraints: &Constraints<'_>) -> Validation {
    let Some(text) = raw.map(str::trim) else {
        return Validation::fail(format!("{} is not a valid string", element));
    };

    if text.chars().count() < constraints.min_length {
        return Validation::fail(format!("{} is shorter than minimum length", element));
    }
    if let Some(codelist) = constraints.codelist {
        if !codelist.contains(text) {
            return Validation::fail(format!("{} not present in codelist", element));
        }
    }
    if is_unknown_or_inapplicable(text) {
        return Validation::fail(format!("{} is unknown or inapplicable", element));
    }

    Validation::pass(element, Value::Text(text.to_string()))
}

/// Validate a reference (`xlink:href` or similar) against a code list.
///
/// A missing code list behaves like an empty one.
pub fn validate_reference(raw: &str, codelist: Option<&CodeList>, element: &str) -> Validation {
    let value = raw.trim();
    if !codelist.is_some_and(|list| list.contains(value)) {
        return Validation::fail(format!("{} not present in codelist", element));
    }
    if is_unknown_or_inapplicable(value) {
        return Validation::fail(format!("{} is unknown or inapplicable", element));
    }
    Validation::pass(element, Value::Text(value.to_string()))
}

/// Whether the final `/` segment of a code is `unknown` or `inapplicable`
pub fn is_unknown_or_inapplicable(value: &str) -> bool {
    let last = value.rsplit('/').next().unwrap_or(value).to_lowercase();
    last == "unknown" || last == "inapplicable"
}

/// URL check used for links: the raw value or `https://` + value must be an
/// absolute http(s)/ftp URL whose host is a dotted domain, an IP address or
/// `localhost`.
pub fn is_valid_url(raw: &str) -> bool {
    let candidate = raw.trim();
    if candidate.is_empty() || candidate.contains(char::is_whitespace) {
        return false;
    }
    is_absolute_url(candidate) || is_absolute_url(&format!("https://{}", candidate))
}

fn is_absolute_url(candidate: &str) -> bool {
    let Ok(url) = Url::parse(candidate) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https" | "ftp" | "ftps") {
        return false;
    }
    match url.host() {
        Some(Host::Domain(domain)) => domain == "localhost" || is_dotted_domain(domain),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        None => false,
    }
}

fn is_dotted_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| !label.is_empty())
        && labels
            .last()
            .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
}
