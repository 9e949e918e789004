//! Read-only access to a parsed WMDR record
//!
//! A [`Record`] owns the parsed XML tree of one document, remembers which
//! element is the logical `WIGOSMetadataRecord` (records are often wrapped
//! in OAI-PMH envelopes) and carries the prefix table every rule path is
//! resolved against. The tree is never mutated.

pub mod namespaces;
pub mod path;

use std::collections::HashSet;
use std::fmt;

use roxmltree::NodeId;
use tracing::debug;

use crate::error::{Result, WmdrError};
pub use namespaces::Namespaces;
use namespaces::{WMDR_1_0, WMDR_RC9, XLINK};
pub use path::{PathExpr, QName};

/// Borrowed element handle
pub type Node<'a, 'input> = roxmltree::Node<'a, 'input>;

const RECORD_ELEMENT: &str = "WIGOSMetadataRecord";
const IDENTIFIER_PATH: &str = "./wmdr:facility/wmdr:ObservingFacility/gml:identifier";
const POSITION_PATH: &str = "./wmdr:facility/wmdr:ObservingFacility/wmdr:geospatialLocation/wmdr:GeospatialLocation/wmdr:geoLocation/gml:Point/gml:pos";
const DEPRECATED_POSITION_PATH: &str = "./wmdr:facility/wmdr:ObservingFacility/wmdr:geospatialLocation/wmdr:GeospatialLocation/wmdr:geoLocation/gml:Point/gml:coordinates";

/// Schema version a record was written against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    V1_0,
    V1_0Rc9,
}

impl SchemaVersion {
    pub fn namespace(self) -> &'static str {
        match self {
            SchemaVersion::V1_0 => WMDR_1_0,
            SchemaVersion::V1_0Rc9 => WMDR_RC9,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::V1_0 => f.write_str("1.0"),
            SchemaVersion::V1_0Rc9 => f.write_str("1.0RC9"),
        }
    }
}

/// Station position read from the facility geolocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lon: f64,
    pub lat: f64,
}

/// Why a record's coordinates could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateIssue {
    #[error("Missing wmdr:geoLocation/gml:Point/gml:pos")]
    Missing,
    #[error("gml:coordinates is deprecated. Use gml:pos")]
    Deprecated,
    #[error("gml:pos is missing values")]
    MissingValues,
    #[error("gml:pos has non-numeric values")]
    NonNumeric,
}

/// One parsed metadata record
pub struct Record<'input> {
    doc: roxmltree::Document<'input>,
    root: NodeId,
    version: SchemaVersion,
    namespaces: Namespaces,
}

impl<'input> Record<'input> {
    /// Parse XML text and locate the logical record root
    pub fn parse(text: &'input str) -> Result<Self> {
        let doc = roxmltree::Document::parse(text)?;
        Self::from_document(doc)
    }

    pub fn from_document(doc: roxmltree::Document<'input>) -> Result<Self> {
        let (root, version) = detect_root(&doc)?;
        let namespaces = match doc.get_node(root) {
            Some(node) => Namespaces::builtin(version).with_declared(node),
            None => Namespaces::builtin(version),
        };
        debug!(%version, "record root located");

        Ok(Self {
            doc,
            root,
            version,
            namespaces,
        })
    }

    /// The `WIGOSMetadataRecord` element
    pub fn root(&self) -> Node<'_, 'input> {
        self.doc
            .get_node(self.root)
            .unwrap_or_else(|| self.doc.root_element())
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// All elements matching `path` relative to `context`, in document order
    pub fn locate<'a>(&'a self, context: Node<'a, 'input>, path: &PathExpr) -> Vec<Node<'a, 'input>> {
        let mut current = vec![context];

        for step in path.steps() {
            let Some(namespace) = self.namespaces.namespace_of(&step.name) else {
                debug!(path = %path, prefix = %step.name, "unknown prefix");
                return Vec::new();
            };

            let mut seen = HashSet::new();
            let mut next = Vec::new();
            for node in &current {
                let matching = |candidate: &Node<'a, 'input>| {
                    candidate.is_element()
                        && candidate.tag_name().name() == step.name.local
                        && candidate.tag_name().namespace().unwrap_or("") == namespace
                };
                if step.descendant {
                    for candidate in node.descendants().skip(1).filter(matching) {
                        if seen.insert(candidate.id()) {
                            next.push(candidate);
                        }
                    }
                } else {
                    for candidate in node.children().filter(matching) {
                        if seen.insert(candidate.id()) {
                            next.push(candidate);
                        }
                    }
                }
            }

            if next.is_empty() {
                return next;
            }
            current = next;
        }

        current
    }

    /// Matches for `path` relative to the record root
    pub fn locate_from_root(&self, path: &PathExpr) -> Vec<Node<'_, 'input>> {
        self.locate(self.root(), path)
    }

    /// First match for `path` relative to `context`
    pub fn first<'a>(&'a self, context: Node<'a, 'input>, path: &PathExpr) -> Option<Node<'a, 'input>> {
        self.locate(context, path).into_iter().next()
    }

    /// Attribute value by (optionally prefixed) name, e.g. `uom` or `xlink:href`
    pub fn attribute<'a>(&self, node: Node<'a, 'input>, name: &QName) -> Option<&'a str> {
        match &name.prefix {
            Some(prefix) => {
                let uri = self.namespaces.resolve(prefix)?;
                node.attribute((uri, name.local.as_str()))
            }
            None => node.attribute(name.local.as_str()),
        }
    }

    /// Facility identifier, empty when absent
    pub fn identifier(&self) -> String {
        self.first(self.root(), &PathExpr::new(IDENTIFIER_PATH))
            .and_then(text)
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    }

    /// Facility coordinates from `gml:pos` ("lat lon [alt]")
    pub fn coordinates(&self) -> std::result::Result<Coordinates, CoordinateIssue> {
        let Some(pos) = self.first(self.root(), &PathExpr::new(POSITION_PATH)) else {
            if self
                .first(self.root(), &PathExpr::new(DEPRECATED_POSITION_PATH))
                .is_some()
            {
                return Err(CoordinateIssue::Deprecated);
            }
            return Err(CoordinateIssue::Missing);
        };

        let values: Vec<&str> = text(pos).unwrap_or("").split_whitespace().collect();
        if values.len() < 2 {
            return Err(CoordinateIssue::MissingValues);
        }
        let lat: f64 = values[0].parse().map_err(|_| CoordinateIssue::NonNumeric)?;
        let lon: f64 = values[1].parse().map_err(|_| CoordinateIssue::NonNumeric)?;

        Ok(Coordinates { lon, lat })
    }
}

/// Text content of an element (first text child)
pub fn text<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.text()
}

/// The `xlink:href` reference of an element
pub fn reference<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attribute((XLINK, "href"))
}

fn is_record(node: Node<'_, '_>, namespace: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == RECORD_ELEMENT
        && node.tag_name().namespace() == Some(namespace)
}

fn detect_root(doc: &roxmltree::Document<'_>) -> Result<(NodeId, SchemaVersion)> {
    let root = doc.root_element();

    if is_record(root, WMDR_1_0) {
        return Ok((root.id(), SchemaVersion::V1_0));
    }
    if let Some(inner) = root.descendants().find(|n| is_record(*n, WMDR_1_0)) {
        debug!("unwrapping enveloped WMDR 1.0 record");
        return Ok((inner.id(), SchemaVersion::V1_0));
    }
    if is_record(root, WMDR_RC9) {
        debug!("document is wmdr/2017 (1.0RC9)");
        return Ok((root.id(), SchemaVersion::V1_0Rc9));
    }
    if let Some(inner) = root.children().find(|n| is_record(*n, WMDR_RC9)) {
        debug!("unwrapping enveloped wmdr/2017 (1.0RC9) record");
        return Ok((inner.id(), SchemaVersion::V1_0Rc9));
    }

    Err(WmdrError::not_wmdr())
}
