//! Loading code lists from SKOS/RDF files
//!
//! Each `<Name>.rdf` file holds a `skos:Collection` whose
//! `skos:member/skos:Concept` entries carry an `rdf:about` URI and a
//! `skos:notation`. Surface cover lists are registered under the lowercase
//! scheme notation used by `SurfaceCoverClassification` references.

use std::fs;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{CodeEntry, CodeList, CodelistRegistry};
use crate::document::namespaces::{RDF, SKOS};
use crate::error::{Result, WmdrError};
use crate::trace_time;

const SURFACE_COVER_SCHEMES: [(&str, &str); 7] = [
    ("SurfaceCoverGlob2009", "globcover2009"),
    ("SurfaceCoverIGBP", "igbp"),
    ("SurfaceCoverLAI", "laifpar"),
    ("SurfaceCoverLCCS", "lccs"),
    ("SurfaceCoverNPP", "npp"),
    ("SurfaceCoverPFT", "pft"),
    ("SurfaceCoverUMD", "umd"),
];

/// Registry key for a code list file stem
pub fn registry_key(stem: &str) -> &str {
    SURFACE_COVER_SCHEMES
        .iter()
        .find(|(file, _)| *file == stem)
        .map(|(_, key)| *key)
        .unwrap_or(stem)
}

/// Parse one SKOS/RDF document into a code list
pub fn parse_codelist(name: &str, text: &str) -> Result<CodeList> {
    let doc = roxmltree::Document::parse(text)?;

    let entries = doc
        .descendants()
        .filter(|n| n.has_tag_name((SKOS, "Concept")))
        .filter(|n| n.parent().is_some_and(|p| p.has_tag_name((SKOS, "member"))))
        .filter_map(|concept| {
            let uri = concept.attribute((RDF, "about"))?;
            let notation = concept
                .children()
                .find(|c| c.has_tag_name((SKOS, "notation")))
                .and_then(|c| c.text())
                .map(|t| t.trim().to_string());
            Some(CodeEntry {
                uri: uri.to_string(),
                notation,
            })
        })
        .collect();

    Ok(CodeList::new(name, entries))
}

/// Load every `*.rdf` file in `dir` into a registry
pub fn load_dir(dir: &Path) -> Result<CodelistRegistry> {
    let start = Instant::now();
    if !dir.is_dir() {
        return Err(WmdrError::resource(dir, "code list directory not found"));
    }

    let mut registry = CodelistRegistry::new();
    for entry in WalkDir::new(dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("rdf") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let text = fs::read_to_string(path).map_err(|e| WmdrError::resource(path, e))?;
        let list = parse_codelist(registry_key(stem), &text)
            .map_err(|e| WmdrError::resource(path, e))?;
        if list.is_empty() {
            warn!(path = %path.display(), "code list has no concepts");
        }
        debug!(name = list.name(), entries = list.len(), "loaded code list");
        registry.insert(list);
    }

    trace_time!(start, "load_codelists", count = registry.len());
    Ok(registry)
}
