//! KPI-2-0 station characteristics

use super::{valid_period, RubricSettings, FACILITY};
use crate::document::PathExpr;
use crate::rubric::{Check, SubRule};
use crate::validate::ValueKind;

fn facility(path: &str) -> String {
    format!("{}/{}", FACILITY, path)
}

pub(super) fn sub_rules(settings: &RubricSettings) -> Vec<SubRule> {
    let mut rules = location_rules();
    rules.extend(organisation_rules(settings));
    rules.extend(environment_rules());
    rules.extend(history_rules(settings));
    rules
}

/// 2-0-00 .. 2-0-02
fn location_rules() -> Vec<SubRule> {
    vec![
        SubRule::new(
            "2-0-00",
            "Coordinates",
            vec![
                Check::href("./wmdr:GeospatialLocation/wmdr:geopositioningMethod", "GeopositioningMethod", "geopositioning method"),
                valid_period("./wmdr:GeospatialLocation", "valid period of geospatial location"),
            ],
        )
        .over_instances(&facility("wmdr:geospatialLocation"), "geospatialLocation"),
        SubRule::new(
            "2-0-01",
            "WMO region",
            vec![Check::RegionMatchesCoordinates {
                path: PathExpr::new(&facility("wmdr:wmoRegion")),
                label: "wmo region",
            }],
        ),
        SubRule::new(
            "2-0-02",
            "Time zone",
            vec![
                Check::TimezoneMatchesCoordinates {
                    path: PathExpr::new(&facility("wmdr:timeZone/wmdr:TimeZone/wmdr:timeZone")),
                    label: "time zone",
                },
                valid_period(&facility("wmdr:timeZone/wmdr:TimeZone"), "valid period of time zone"),
            ],
        ),
    ]
}

/// 2-0-03 .. 2-0-06
fn organisation_rules(settings: &RubricSettings) -> Vec<SubRule> {
    let site_description = facility("wmdr:description/wmdr:Description/wmdr:description");
    let min_length = settings.site_description_min_length;

    vec![
        SubRule::new(
            "2-0-03",
            "Supervising organization",
            vec![
                Check::string(
                    &facility("wmdr:responsibleParty/wmdr:ResponsibleParty/wmdr:responsibleParty/gmd:CI_ResponsibleParty/gmd:organisationName/gco:CharacterString"),
                    "supervising organization",
                ),
                valid_period(&facility("wmdr:responsibleParty/wmdr:ResponsibleParty"), "valid period of supervising organization"),
            ],
        ),
        SubRule::new(
            "2-0-04",
            "Station URL",
            vec![Check::text(
                &facility("wmdr:onlineResource/gmd:CI_OnlineResource/gmd:linkage/gmd:URL"),
                ValueKind::Url,
                "facility URL",
            )],
        ),
        SubRule::new(
            "2-0-05",
            "Other links",
            vec![Check::AdditionalLinks {
                path: PathExpr::new(&facility("wmdr:onlineResource/gmd:CI_OnlineResource/gmd:linkage/gmd:URL")),
            }],
        ),
        SubRule::new(
            "2-0-06",
            "Site description",
            vec![
                Check::string(&site_description, "site description"),
                Check::MinimumLength {
                    path: PathExpr::new(&site_description),
                    min_length,
                    message: format!("Site description is shorter than required ({} chars)", min_length),
                },
            ],
        ),
    ]
}

/// 2-0-07 .. 2-0-11
fn environment_rules() -> Vec<SubRule> {
    let topography = |path: &str| facility(&format!("wmdr:topographyBathymetry/wmdr:TopographyBathymetry/{}", path));
    let population = |path: &str| facility(&format!("wmdr:population/wmdr:Population/{}", path));

    vec![
        SubRule::new(
            "2-0-07",
            "Climate zone",
            vec![
                Check::href(&facility("wmdr:climateZone/wmdr:ClimateZone/wmdr:climateZone"), "ClimateZone", "climate zone"),
                valid_period(&facility("wmdr:climateZone/wmdr:ClimateZone"), "valid period of climate zone"),
            ],
        ),
        SubRule::new(
            "2-0-08",
            "Predominant surface cover",
            vec![
                Check::SurfaceCover {
                    scheme: PathExpr::new(&facility("wmdr:surfaceCover/wmdr:SurfaceCover/wmdr:surfaceCoverClassification")),
                    cover: PathExpr::new(&facility("wmdr:surfaceCover/wmdr:SurfaceCover/wmdr:surfaceCover")),
                },
                valid_period(&facility("wmdr:surfaceCover/wmdr:SurfaceCover"), "valid period of surface cover"),
            ],
        ),
        SubRule::new(
            "2-0-09",
            "Surface roughness",
            vec![
                Check::href(
                    &facility("wmdr:surfaceRoughness/wmdr:SurfaceRoughness/wmdr:surfaceRoughness"),
                    "SurfaceRoughnessDavenport",
                    "surface roughness",
                ),
                valid_period(&facility("wmdr:surfaceRoughness/wmdr:SurfaceRoughness"), "valid period of surface roughness"),
            ],
        ),
        SubRule::new(
            "2-0-10",
            "Topography or bathymetry",
            vec![
                Check::href(&topography("wmdr:localTopography"), "LocalTopography", "local topography"),
                Check::href(&topography("wmdr:relativeElevation"), "RelativeElevation", "relative elevation"),
                Check::href(&topography("wmdr:topographicContext"), "TopographicContext", "topographic context"),
                Check::href(&topography("wmdr:altitudeOrDepth"), "AltitudeOrDepth", "altitude or depth"),
                valid_period(
                    &facility("wmdr:topographyBathymetry/wmdr:TopographyBathymetry"),
                    "valid period of topography or bathymetry",
                ),
            ],
        ),
        SubRule::new(
            "2-0-11",
            "Population",
            vec![
                Check::text(&population("wmdr:population10km"), ValueKind::Integer, "population10km"),
                Check::text(&population("wmdr:population50km"), ValueKind::Integer, "population50km"),
                valid_period(&facility("wmdr:population/wmdr:Population"), "valid period of population"),
            ],
        ),
    ]
}

/// 2-0-12 .. 2-0-13
fn history_rules(settings: &RubricSettings) -> Vec<SubRule> {
    vec![
        SubRule::new(
            "2-0-12",
            "Station / platform event logbook",
            vec![
                valid_period("./wmdr:EventReport", "valid period of reported event"),
                Check::href("./wmdr:EventReport/wmdr:typeOfEvent", "EventAtFacility", "type of event"),
                Check::string_min(
                    "./wmdr:EventReport/wmdr:description",
                    "event description",
                    settings.event_description_min_length,
                ),
                Check::string("./wmdr:EventReport/wmdr:author", "author of log entry"),
                Check::text(
                    "./wmdr:EventReport/wmdr:documentationURL",
                    ValueKind::Url,
                    "documentation URL of log entry",
                ),
            ],
        )
        .over_instances(&facility("wmdr:facilityLog/wmdr:FacilityLog/wmdr:logEntry"), "logEntry"),
        SubRule::new(
            "2-0-13",
            "Territory",
            vec![
                Check::href(&facility("wmdr:territory/wmdr:Territory/wmdr:territoryName"), "TerritoryName", "territory name"),
                valid_period(&facility("wmdr:territory/wmdr:Territory"), "valid period of territory"),
            ],
        ),
    ]
}
