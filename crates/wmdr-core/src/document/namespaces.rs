//! Prefix bindings used by rule paths

use std::collections::BTreeMap;

use super::path::QName;
use super::SchemaVersion;
use super::Node;

pub const GCO: &str = "http://www.isotc211.org/2005/gco";
pub const GMD: &str = "http://www.isotc211.org/2005/gmd";
pub const GML: &str = "http://www.opengis.net/gml/3.2";
pub const GMX: &str = "http://www.isotc211.org/2005/gmx";
pub const OM: &str = "http://www.opengis.net/om/2.0";
pub const WMDR_1_0: &str = "http://def.wmo.int/wmdr/1.0";
pub const WMDR_RC9: &str = "http://def.wmo.int/wmdr/2017";
pub const XLINK: &str = "http://www.w3.org/1999/xlink";
pub const SKOS: &str = "http://www.w3.org/2004/02/skos/core#";
pub const DCT: &str = "http://purl.org/dc/terms/";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// Immutable prefix → namespace URI table.
///
/// Built-in prefixes always win over whatever the document declares, so a
/// rule path like `wmdr:facility` means the same thing in every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    bindings: BTreeMap<String, String>,
}

impl Namespaces {
    /// Built-in bindings with `wmdr` bound to the namespace of `version`
    pub fn builtin(version: SchemaVersion) -> Self {
        let bindings = [
            ("gco", GCO),
            ("gmd", GMD),
            ("gml", GML),
            ("gmx", GMX),
            ("om", OM),
            ("wmdr", version.namespace()),
            ("xlink", XLINK),
            ("skos", SKOS),
            ("dct", DCT),
            ("rdfs", RDFS),
            ("rdf", RDF),
        ]
        .into_iter()
        .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
        .collect();

        Self { bindings }
    }

    /// Merge the namespaces in scope at `node` without overriding built-ins.
    ///
    /// A default namespace is bound under the last `/` segment of its URI,
    /// or `default` when that segment is empty.
    pub fn with_declared(mut self, node: Node<'_, '_>) -> Self {
        for ns in node.namespaces() {
            let prefix = match ns.name() {
                Some(prefix) => prefix.to_string(),
                None => default_prefix(ns.uri()),
            };
            self.bindings
                .entry(prefix)
                .or_insert_with(|| ns.uri().to_string());
        }
        self
    }

    /// Look up the URI bound to `prefix`
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }

    /// Namespace a qualified name must carry; unprefixed names carry none
    /// and resolve to the empty string.
    pub fn namespace_of(&self, name: &QName) -> Option<&str> {
        match &name.prefix {
            Some(prefix) => self.resolve(prefix),
            None => Some(""),
        }
    }
}

fn default_prefix(uri: &str) -> String {
    match uri.trim_end_matches('/').rsplit('/').next() {
        Some(segment) if !segment.is_empty() && segment != uri => segment.to_string(),
        _ => "default".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wmdr_prefix_follows_version() {
        let v1 = Namespaces::builtin(SchemaVersion::V1_0);
        let rc9 = Namespaces::builtin(SchemaVersion::V1_0Rc9);
        assert_eq!(v1.resolve("wmdr"), Some(WMDR_1_0));
        assert_eq!(rc9.resolve("wmdr"), Some(WMDR_RC9));
        assert_eq!(v1.resolve("gmx"), Some(GMX));
    }

    #[test]
    fn test_declared_prefixes_do_not_override_builtins() {
        let xml = r#"<r xmlns:gml="urn:other" xmlns:ex="urn:example"/>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let ns = Namespaces::builtin(SchemaVersion::V1_0).with_declared(doc.root_element());
        assert_eq!(ns.resolve("gml"), Some(GML));
        assert_eq!(ns.resolve("ex"), Some("urn:example"));
    }

    #[test]
    fn test_default_namespace_bound_by_last_segment() {
        assert_eq!(default_prefix("http://example.org/schemas/station"), "station");
        assert_eq!(default_prefix("urn:nothing"), "default");
    }
}
