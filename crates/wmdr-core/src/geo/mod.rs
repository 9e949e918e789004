//! Geospatial consistency checks
//!
//! Region and timezone boundaries are GeoJSON feature collections loaded
//! once and shared read-only between evaluations.

mod geojson;

use std::fs;
use std::path::Path;

use geo::{Contains, MultiPolygon, Point};
use tracing::{debug, warn};

use crate::error::{Result, WmdrError};
use geojson::FeatureCollection;

pub const REGIONS_FILE: &str = "WMO_regions.json";
pub const TIMEZONES_FILE: &str = "timezones.json";

/// Latitude below which every point belongs to the Antarctic region
pub const ANTARCTIC_LATITUDE: f64 = -60.0;
const ANTARCTICA_NOTATION: &str = "antarctica";
const ANTARCTICA_URI: &str = "http://codes.wmo.int/wmdr/WMORegion/antarctica";

/// Failure of a timezone check; always recovered as a rule comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeoError {
    #[error("timezone not found in code list")]
    Lookup,
    #[error("coordinates don't match timezone")]
    Mismatch,
}

/// Which form of region code to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionForm {
    /// Code list URI, e.g. `http://codes.wmo.int/wmdr/WMORegion/europe`
    Uri,
    /// Short notation, e.g. `europe`
    Notation,
}

#[derive(Debug, Clone)]
pub struct RegionBoundary {
    pub code: String,
    pub notation: String,
    pub area: MultiPolygon<f64>,
}

#[derive(Debug, Clone)]
pub struct TimezoneBoundary {
    pub tzid: String,
    pub area: MultiPolygon<f64>,
}

/// Region and timezone polygons
#[derive(Debug, Clone, Default)]
pub struct BoundaryDatasets {
    regions: Vec<RegionBoundary>,
    timezones: Vec<TimezoneBoundary>,
}

impl BoundaryDatasets {
    pub fn new(regions: Vec<RegionBoundary>, timezones: Vec<TimezoneBoundary>) -> Self {
        Self { regions, timezones }
    }

    /// Load `WMO_regions.json` and `timezones.json` from `dir`.
    ///
    /// A missing file yields an empty dataset and a warning; every region or
    /// timezone check then fails soft.
    pub fn load(dir: &Path) -> Result<Self> {
        let regions = match read_optional(&dir.join(REGIONS_FILE))? {
            Some(text) => parse_regions(&text)
                .map_err(|e| WmdrError::resource(dir.join(REGIONS_FILE), e))?,
            None => Vec::new(),
        };
        let timezones = match read_optional(&dir.join(TIMEZONES_FILE))? {
            Some(text) => parse_timezones(&text)
                .map_err(|e| WmdrError::resource(dir.join(TIMEZONES_FILE), e))?,
            None => Vec::new(),
        };
        debug!(
            regions = regions.len(),
            timezones = timezones.len(),
            "loaded boundary datasets"
        );
        Ok(Self::new(regions, timezones))
    }

    /// Build datasets from GeoJSON text
    pub fn from_geojson(regions: &str, timezones: &str) -> Result<Self> {
        Ok(Self::new(parse_regions(regions)?, parse_timezones(timezones)?))
    }

    pub fn regions(&self) -> &[RegionBoundary] {
        &self.regions
    }

    pub fn timezones(&self) -> &[TimezoneBoundary] {
        &self.timezones
    }

    /// Region code for a point.
    ///
    /// South of [`ANTARCTIC_LATITUDE`] the answer is always Antarctica.
    /// Otherwise the last region polygon containing the point wins.
    pub fn region_for(&self, lon: f64, lat: f64, form: RegionForm) -> Option<&str> {
        if lat < ANTARCTIC_LATITUDE {
            return Some(match form {
                RegionForm::Notation => ANTARCTICA_NOTATION,
                RegionForm::Uri => ANTARCTICA_URI,
            });
        }

        let point = Point::new(lon, lat);
        self.regions
            .iter()
            .rev()
            .find(|region| region.area.contains(&point))
            .map(|region| match form {
                RegionForm::Notation => region.notation.as_str(),
                RegionForm::Uri => region.code.as_str(),
            })
    }

    /// Check that a point lies within the named timezone polygon
    pub fn is_within_timezone(&self, lon: f64, lat: f64, tzid: &str) -> std::result::Result<(), GeoError> {
        let zone = self
            .timezones
            .iter()
            .find(|zone| zone.tzid == tzid)
            .ok_or(GeoError::Lookup)?;

        if zone.area.contains(&Point::new(lon, lat)) {
            Ok(())
        } else {
            Err(GeoError::Mismatch)
        }
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        warn!(path = %path.display(), "boundary dataset missing");
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|e| WmdrError::resource(path, e))
}

fn parse_regions(text: &str) -> Result<Vec<RegionBoundary>> {
    let collection: FeatureCollection = serde_json::from_str(text)?;
    Ok(collection
        .features
        .iter()
        .filter_map(|feature| {
            let area = feature.area()?;
            let code = feature.property("code").unwrap_or_default();
            let notation = feature.property("notation").unwrap_or_default();
            Some(RegionBoundary {
                code,
                notation,
                area,
            })
        })
        .collect())
}

fn parse_timezones(text: &str) -> Result<Vec<TimezoneBoundary>> {
    let collection: FeatureCollection = serde_json::from_str(text)?;
    Ok(collection
        .features
        .iter()
        .filter_map(|feature| {
            Some(TimezoneBoundary {
                tzid: feature.property("tzid")?,
                area: feature.area()?,
            })
        })
        .collect())
}
