//! Shared fixtures: record builders and in-memory resources

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use wmdr_core::codelist::{CodeList, CodelistRegistry};
use wmdr_core::geo::BoundaryDatasets;
use wmdr_core::rubric::table::RubricSettings;
use wmdr_core::rubric::{EvaluationOptions, Evaluator, Rubric};

pub const NAMESPACES: &str = r#"xmlns:wmdr="http://def.wmo.int/wmdr/1.0" xmlns:gml="http://www.opengis.net/gml/3.2" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:gmd="http://www.isotc211.org/2005/gmd" xmlns:gco="http://www.isotc211.org/2005/gco" xmlns:om="http://www.opengis.net/om/2.0""#;

pub const IDENTIFIER: &str = "0-20000-0-06610";

pub const EUROPE: &str = "http://codes.wmo.int/wmdr/WMORegion/europe";
pub const AFRICA: &str = "http://codes.wmo.int/wmdr/WMORegion/africa";

/// Station position inside the Europe region and the Europe/Zurich zone
pub const LOCATION: &str = r#"<wmdr:geospatialLocation>
        <wmdr:GeospatialLocation>
          <wmdr:geoLocation><gml:Point gml:id="p1"><gml:pos>46.81 6.94 490</gml:pos></gml:Point></wmdr:geoLocation>
          <wmdr:geopositioningMethod xlink:href="http://codes.wmo.int/wmdr/GeopositioningMethod/gps"/>
          <wmdr:validPeriod><gml:TimePeriod gml:id="tp1"><gml:beginPosition>2010-01-01T00:00:00Z</gml:beginPosition><gml:endPosition/></gml:TimePeriod></wmdr:validPeriod>
        </wmdr:GeospatialLocation>
      </wmdr:geospatialLocation>"#;

/// A complete WMDR 1.0 record around `facility` content
pub fn record(facility: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<wmdr:WIGOSMetadataRecord {NAMESPACES} gml:id="record">
  <wmdr:headerInformation/>
  <wmdr:facility>
    <wmdr:ObservingFacility gml:id="facility">
      <gml:identifier codeSpace="http://wigos.wmo.int">{IDENTIFIER}</gml:identifier>
      {facility}
    </wmdr:ObservingFacility>
  </wmdr:facility>
</wmdr:WIGOSMetadataRecord>"#
    )
}

pub fn region(href: &str) -> String {
    format!(r#"<wmdr:wmoRegion xlink:href="{href}"/>"#)
}

pub fn climate_zone(href: &str) -> String {
    format!(
        r#"<wmdr:climateZone><wmdr:ClimateZone>
        <wmdr:climateZone xlink:href="{href}"/>
        <wmdr:validPeriod><gml:TimePeriod gml:id="cz"><gml:beginPosition>2015-06-01</gml:beginPosition><gml:endPosition/></gml:TimePeriod></wmdr:validPeriod>
      </wmdr:ClimateZone></wmdr:climateZone>"#
    )
}

pub fn time_zone(tzid: &str) -> String {
    format!(
        r#"<wmdr:timeZone><wmdr:TimeZone>
        <wmdr:timeZone xlink:href="{tzid}"/>
        <wmdr:validPeriod><gml:TimePeriod gml:id="tz"><gml:beginPosition>2010-01-01</gml:beginPosition><gml:endPosition/></gml:TimePeriod></wmdr:validPeriod>
      </wmdr:TimeZone></wmdr:timeZone>"#
    )
}

pub fn surface_cover(scheme: &str, cover: &str) -> String {
    format!(
        r#"<wmdr:surfaceCover><wmdr:SurfaceCover>
        <wmdr:surfaceCoverClassification xlink:href="http://codes.wmo.int/wmdr/SurfaceCoverClassification/{scheme}"/>
        <wmdr:surfaceCover xlink:href="{cover}"/>
        <wmdr:validPeriod><gml:TimePeriod gml:id="sc"><gml:beginPosition>2012-01-01</gml:beginPosition><gml:endPosition/></gml:TimePeriod></wmdr:validPeriod>
      </wmdr:SurfaceCover></wmdr:surfaceCover>"#
    )
}

pub fn site_description(text: &str) -> String {
    format!(
        r#"<wmdr:description><wmdr:Description><wmdr:description>{text}</wmdr:description></wmdr:Description></wmdr:description>"#
    )
}

pub fn log_entry(description: &str) -> String {
    format!(
        r#"<wmdr:logEntry><wmdr:EventReport>
          <wmdr:validPeriod><gml:TimePeriod gml:id="ev"><gml:beginPosition>2019-03-01T00:00:00Z</gml:beginPosition><gml:endPosition/></gml:TimePeriod></wmdr:validPeriod>
          <wmdr:typeOfEvent xlink:href="http://codes.wmo.int/wmdr/EventAtFacility/relocation"/>
          <wmdr:description>{description}</wmdr:description>
          <wmdr:author>Station manager</wmdr:author>
          <wmdr:documentationURL>https://example.org/logbook/2019</wmdr:documentationURL>
        </wmdr:EventReport></wmdr:logEntry>"#
    )
}

pub fn facility_log(entries: &[String]) -> String {
    format!(
        "<wmdr:facilityLog><wmdr:FacilityLog>{}</wmdr:FacilityLog></wmdr:facilityLog>",
        entries.concat()
    )
}

/// One deployment with the given application areas and valid period end
pub fn deployment(id: &str, areas: &[&str], end: &str) -> String {
    let areas: String = areas
        .iter()
        .map(|area| format!(r#"<wmdr:applicationArea xlink:href="http://codes.wmo.int/wmdr/ApplicationArea/{area}"/>"#))
        .collect();
    format!(
        r#"<wmdr:deployment><wmdr:Deployment gml:id="{id}">
              {areas}
              <wmdr:validPeriod><gml:TimePeriod gml:id="{id}-tp"><gml:beginPosition>2020-01-01T00:00:00Z</gml:beginPosition>{end}</gml:TimePeriod></wmdr:validPeriod>
            </wmdr:Deployment></wmdr:deployment>"#
    )
}

/// One observing capability whose observation holds `deployments`
pub fn observation(id: &str, deployments: &[String]) -> String {
    format!(
        r#"<wmdr:observation><wmdr:ObservingCapability gml:id="{id}-cap">
        <wmdr:observation><om:OM_Observation gml:id="{id}">
          <om:type xlink:href="http://codes.wmo.int/wmdr/Geometry/point"/>
          <om:procedure><wmdr:Process gml:id="{id}-proc">{deployments}</wmdr:Process></om:procedure>
        </om:OM_Observation></wmdr:observation>
      </wmdr:ObservingCapability></wmdr:observation>"#,
        deployments = deployments.concat()
    )
}

pub fn end_position(value: &str) -> String {
    format!("<gml:endPosition>{value}</gml:endPosition>")
}

pub fn codelists() -> CodelistRegistry {
    const WMDR: &str = "http://codes.wmo.int/wmdr";
    let list = |name: &str, codes: &[&str]| {
        CodeList::from_uris(name, codes.iter().map(|code| format!("{WMDR}/{name}/{code}")))
    };

    CodelistRegistry::new()
        .with(list("GeopositioningMethod", &["gps", "unknown"]))
        .with(list("ClimateZone", &["Cfb", "Dfc", "unknown"]))
        .with(list("EventAtFacility", &["relocation", "other"]))
        .with(list("Geometry", &["point", "unknown"]))
        .with(list("ApplicationArea", &["1", "2", "3", "unknown"]))
        .with(list("ProgramAffiliation", &["GOS", "GAW", "unknown"]))
        .with(list("WMORegion", &["europe", "africa", "antarctica"]))
        .with(list("SurfaceCoverClassification", &["IGBP", "UMD", "unknown"]))
        .with(CodeList::from_uris(
            "igbp",
            ["grasslands", "croplands", "urbanAndBuiltUp"]
                .map(|code| format!("{WMDR}/SurfaceCoverIGBP/{code}")),
        ))
        .with(list("PurposeOfFrequencyUse", &["observation", "telecomms", "unknown"]))
        .with(list("FrequencyUse", &["Tx", "Rx", "TxRx"]))
        .with(list("TransmissionMode", &["continuous", "pulsed"]))
        .with(list("Polarization", &["horizontal", "vertical"]))
}

pub fn boundaries() -> BoundaryDatasets {
    let regions = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"code":"http://codes.wmo.int/wmdr/WMORegion/europe","notation":"europe"},
         "geometry":{"type":"Polygon","coordinates":[[[-10,35],[40,35],[40,70],[-10,70],[-10,35]]]}},
        {"type":"Feature","properties":{"code":"http://codes.wmo.int/wmdr/WMORegion/africa","notation":"africa"},
         "geometry":{"type":"Polygon","coordinates":[[[-20,-35],[50,-35],[50,35],[-20,35],[-20,-35]]]}}]}"#;
    let timezones = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"tzid":"Europe/Zurich"},
         "geometry":{"type":"Polygon","coordinates":[[[5,45],[11,45],[11,48],[5,48],[5,45]]]}}]}"#;
    BoundaryDatasets::from_geojson(regions, timezones).unwrap()
}

pub fn reference_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub fn evaluator_for(rubric: Rubric) -> Evaluator {
    evaluator_with(rubric, codelists())
}

pub fn evaluator_with(rubric: Rubric, codelists: CodelistRegistry) -> Evaluator {
    Evaluator::new(rubric, Arc::new(codelists), Arc::new(boundaries())).with_options(
        EvaluationOptions {
            reference_time: reference_time(),
            near_real_time_window: TimeDelta::hours(24),
        },
    )
}

#[allow(dead_code)]
pub fn evaluator() -> Evaluator {
    evaluator_for(Rubric::standard(&RubricSettings::default()))
}
