//! Schema compliance verdicts for the mandatory rule
//!
//! Full XSD validation is delegated to external tooling; its outcome is
//! supplied as a [`SchemaVerdict`] (e.g. `--schema-verdict FILE`). The
//! built-in [`StructuralValidator`] only checks the elements every record
//! needs before any rule can say something useful.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::{text, PathExpr, Record};
use crate::error::{Result, WmdrError};

/// Outcome of validating a record against the WMDR schema
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaVerdict {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl SchemaVerdict {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn invalid(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }

    /// Read a verdict written by an external validator
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| WmdrError::io_operation("read schema verdict", path.display(), e))?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Produces a verdict for a parsed record
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, record: &Record<'_>) -> SchemaVerdict;
}

/// A verdict fixed up front, for records validated elsewhere
impl SchemaValidator for SchemaVerdict {
    fn validate(&self, _record: &Record<'_>) -> SchemaVerdict {
        self.clone()
    }
}

/// Required elements: path, label, whether text content is required
const REQUIRED: [(&str, &str, bool); 3] = [
    ("./wmdr:headerInformation", "headerInformation", false),
    ("./wmdr:facility/wmdr:ObservingFacility", "ObservingFacility", false),
    (
        "./wmdr:facility/wmdr:ObservingFacility/gml:identifier",
        "facility identifier",
        true,
    ),
];

/// Checks required top-level structure only
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl SchemaValidator for StructuralValidator {
    fn validate(&self, record: &Record<'_>) -> SchemaVerdict {
        let errors: Vec<String> = REQUIRED
            .iter()
            .filter_map(|(path, label, needs_text)| {
                let present = match record.first(record.root(), &PathExpr::new(path)) {
                    Some(node) if *needs_text => text(node).is_some_and(|t| !t.trim().is_empty()),
                    Some(_) => true,
                    None => false,
                };
                (!present).then(|| format!("{} not found", label))
            })
            .collect();

        if errors.is_empty() {
            SchemaVerdict::valid()
        } else {
            SchemaVerdict::invalid(errors)
        }
    }
}
