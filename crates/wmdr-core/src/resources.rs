//! Reference data loaded once per process
//!
//! Layout of a resource directory:
//!
//! ```text
//! <dir>/codelists/*.rdf
//! <dir>/maps/WMO_regions.json
//! <dir>/maps/timezones.json
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::codelist::{rdf, CodelistRegistry};
use crate::error::{Result, WmdrError};
use crate::geo::BoundaryDatasets;
use crate::rubric::{Evaluator, Rubric};
use crate::trace_time;

pub const CODELISTS_DIR: &str = "codelists";
pub const MAPS_DIR: &str = "maps";

/// Shared code lists and boundary datasets
#[derive(Debug, Clone, Default)]
pub struct Resources {
    pub codelists: Arc<CodelistRegistry>,
    pub boundaries: Arc<BoundaryDatasets>,
}

impl Resources {
    pub fn new(codelists: CodelistRegistry, boundaries: BoundaryDatasets) -> Self {
        Self {
            codelists: Arc::new(codelists),
            boundaries: Arc::new(boundaries),
        }
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let start = Instant::now();
        if !dir.is_dir() {
            return Err(WmdrError::resource(dir, "resource directory not found"));
        }

        let codelists = rdf::load_dir(&dir.join(CODELISTS_DIR))?;
        let boundaries = BoundaryDatasets::load(&dir.join(MAPS_DIR))?;
        info!(
            dir = %dir.display(),
            codelists = codelists.len(),
            regions = boundaries.regions().len(),
            timezones = boundaries.timezones().len(),
            "loaded resources"
        );
        trace_time!(start, "load_resources");

        Ok(Self::new(codelists, boundaries))
    }

    /// An evaluator sharing these resources
    pub fn evaluator(&self, rubric: Rubric) -> Evaluator {
        Evaluator::new(rubric, Arc::clone(&self.codelists), Arc::clone(&self.boundaries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_dir() {
        let dir = tempdir().unwrap();
        let err = Resources::load(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, WmdrError::Resource { .. }));
    }

    #[test]
    fn test_load_codelists_without_maps() {
        let dir = tempdir().unwrap();
        let codelists = dir.path().join(CODELISTS_DIR);
        fs::create_dir_all(&codelists).unwrap();
        fs::write(
            codelists.join("Exposure.rdf"),
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:skos="http://www.w3.org/2004/02/skos/core#">
  <skos:Collection rdf:about="http://codes.wmo.int/wmdr/Exposure">
    <skos:member>
      <skos:Concept rdf:about="http://codes.wmo.int/wmdr/Exposure/1"><skos:notation>1</skos:notation></skos:Concept>
    </skos:member>
  </skos:Collection>
</rdf:RDF>"#,
        )
        .unwrap();

        let resources = Resources::load(dir.path()).unwrap();
        assert!(resources
            .codelists
            .get("Exposure")
            .unwrap()
            .contains("http://codes.wmo.int/wmdr/Exposure/1"));
        assert!(resources.boundaries.regions().is_empty());
    }
}
