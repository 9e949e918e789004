//! Path expressions used to locate elements in a record
//!
//! Grammar: `/`-separated qualified names. A leading `./` (or nothing) is
//! relative to the context node, a leading `//` or an empty step searches
//! descendants, and `.` alone selects the context node itself.

use std::fmt;

/// A possibly prefixed element name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    pub fn parse(name: &str) -> Self {
        match name.split_once(':') {
            Some((prefix, local)) => Self {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            None => Self {
                prefix: None,
                local: name.to_string(),
            },
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local),
            None => f.write_str(&self.local),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Step {
    pub descendant: bool,
    pub name: QName,
}

/// Parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    raw: String,
    steps: Vec<Step>,
}

impl PathExpr {
    pub fn new(expr: &str) -> Self {
        let raw = expr.trim();
        let (mut descendant, rest) = if let Some(rest) = raw.strip_prefix("//") {
            (true, rest)
        } else if let Some(rest) = raw.strip_prefix("./") {
            (false, rest)
        } else if raw == "." {
            (false, "")
        } else {
            (false, raw)
        };

        let mut steps = Vec::new();
        for segment in rest.split('/') {
            match segment {
                "" => descendant = true,
                "." => {}
                name => {
                    steps.push(Step {
                        descendant,
                        name: QName::parse(name),
                    });
                    descendant = false;
                }
            }
        }

        Self {
            raw: raw.to_string(),
            steps,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the expression selects the context node itself
    pub fn is_self(&self) -> bool {
        self.steps.is_empty()
    }

    pub(crate) fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl From<&str> for PathExpr {
    fn from(expr: &str) -> Self {
        Self::new(expr)
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_child_steps() {
        let path = PathExpr::new("./wmdr:facility/wmdr:ObservingFacility/gml:identifier");
        let steps = path.steps();
        assert_eq!(steps.len(), 3);
        assert!(steps.iter().all(|s| !s.descendant));
        assert_eq!(steps[2].name.prefix.as_deref(), Some("gml"));
        assert_eq!(steps[2].name.local, "identifier");
    }

    #[test]
    fn test_leading_double_slash_is_descendant() {
        let path = PathExpr::new("//wmdr:deployment/wmdr:Deployment");
        assert!(path.steps()[0].descendant);
        assert!(!path.steps()[1].descendant);
    }

    #[test]
    fn test_inner_double_slash_is_descendant() {
        let path = PathExpr::new("wmdr:a//wmdr:b");
        assert!(!path.steps()[0].descendant);
        assert!(path.steps()[1].descendant);
    }

    #[test]
    fn test_dot_selects_self() {
        assert!(PathExpr::new(".").is_self());
        assert!(!PathExpr::new("wmdr:applicationArea").is_self());
    }

    #[test]
    fn test_unprefixed_name() {
        let name = QName::parse("uom");
        assert_eq!(name.prefix, None);
        assert_eq!(name.to_string(), "uom");
    }
}
