//! KPI-3-1 deployment, evaluated per `om:OM_Observation`

use crate::document::PathExpr;
use crate::rubric::{Check, SubRule};
use crate::validate::ValueKind;

const DEPLOYMENT: &str = "./om:procedure/wmdr:Process/wmdr:deployment/wmdr:Deployment";

fn deployment(path: &str) -> String {
    format!("{}/{}", DEPLOYMENT, path)
}

fn equipment(path: &str) -> String {
    deployment(&format!("wmdr:deployedEquipment/wmdr:Equipment/{}", path))
}

fn frequencies(path: &str) -> String {
    equipment(&format!("wmdr:frequency/wmdr:Frequencies/{}", path))
}

pub(super) fn sub_rules() -> Vec<SubRule> {
    let mut rules = siting_rules();
    rules.extend(operation_rules());
    rules.extend(equipment_rules());
    rules.extend(frequency_rules());
    rules
}

/// 3-1-00 .. 3-1-09
fn siting_rules() -> Vec<SubRule> {
    let contact = "./om:metadata/gmd:MD_Metadata/gmd:contact/gmd:CI_ResponsibleParty";
    let online = "./om:result/wmdr:ResultSet/wmdr:distributionInfo/gmd:MD_Distribution/gmd:transferOptions/gmd:MD_DigitalTransferOptions/gmd:onLine/gmd:CI_OnlineResource";

    vec![
        SubRule::new(
            "3-1-00",
            "Source of observation",
            vec![Check::href(&deployment("wmdr:sourceOfObservation"), "SourceOfObservation", "deployment number {n} source of observation")],
        ),
        SubRule::new(
            "3-1-01",
            "Distance from reference surface",
            vec![Check::text(
                &deployment("wmdr:heightAboveLocalReferenceSurface"),
                ValueKind::Float,
                "deployment number {n} height above local reference surface",
            )],
        ),
        SubRule::new(
            "3-1-02",
            "Type of reference surface",
            vec![Check::href(&deployment("wmdr:localReferenceSurface"), "ReferenceSurfaceType", "deployment number {n} reference surface type")],
        ),
        SubRule::new(
            "3-1-03",
            "Application area",
            vec![Check::href(&deployment("wmdr:applicationArea"), "ApplicationArea", "deployment number {n} application area")],
        ),
        SubRule::new(
            "3-1-04",
            "Exposure of instrument",
            vec![Check::href(&deployment("wmdr:exposure"), "Exposure", "deployment number {n} exposure")],
        ),
        SubRule::new(
            "3-1-05",
            "Configuration of instrument",
            vec![Check::string(&deployment("wmdr:configuration"), "deployment number {n} configuration")],
        ),
        SubRule::new(
            "3-1-06",
            "Representativeness of observation",
            vec![Check::href(&deployment("wmdr:representativeness"), "Representativeness", "deployment number {n} representativeness")],
        ),
        SubRule::new(
            "3-1-07",
            "Measurement leader / principal investigator",
            vec![Check::string(
                &format!("{}/gmd:individualName/gco:CharacterString", contact),
                "deployment number {n} contact responsible party individual name",
            )],
        ),
        SubRule::new(
            "3-1-08",
            "Organization",
            vec![Check::string(
                &format!("{}/gmd:organizationName/gco:CharacterString", contact),
                "deployment number {n} contact responsible party organization name",
            )],
        ),
        SubRule::new(
            "3-1-09",
            "Near real time",
            vec![
                Check::string(
                    &format!("{}/gmd:description/gco:CharacterString", online),
                    "deployment number {n} online resource description",
                ),
                Check::text(
                    &format!("{}/gmd:linkage/gmd:URL", online),
                    ValueKind::Url,
                    "deployment number {n} online resource linkage url",
                ),
            ],
        ),
    ]
}

/// 3-1-12 .. 3-1-14
fn operation_rules() -> Vec<SubRule> {
    vec![
        SubRule::new(
            "3-1-12",
            "Data communication method",
            vec![Check::href(&deployment("wmdr:communicationMethod"), "DataCommunicationMethod", "deployment number {n} communication method")],
        ),
        SubRule::new(
            "3-1-13",
            "Instrument QA/QC schedule",
            vec![Check::string(&deployment("wmdr:controlSchedule"), "deployment number {n} control schedule")],
        ),
        SubRule::new(
            "3-1-14",
            "Maintenance schedule",
            vec![Check::string(&deployment("wmdr:maintenanceSchedule"), "deployment number {n} maintenance schedule")],
        ),
    ]
}

/// 3-1-15 .. 3-1-24
fn equipment_rules() -> Vec<SubRule> {
    let location = "wmdr:geospatialLocation/wmdr:GeospatialLocation";
    let status = "wmdr:instrumentOperatingStatus/wmdr:InstrumentOperatingStatus";

    vec![
        SubRule::new(
            "3-1-15",
            "Instrument details",
            vec![
                Check::string(&equipment("wmdr:manufacturer"), "deployment number {n} manufacturer"),
                Check::string(&equipment("wmdr:model"), "deployment number {n} model"),
                Check::string(&equipment("wmdr:serialNumber"), "deployment number {n} serialNumber"),
            ],
        ),
        SubRule::new(
            "3-1-17",
            "Coordinates",
            vec![
                Check::string(&equipment(&format!("{}/wmdr:geoLocation/gml:Point/gml:pos", location)), "deployment number {n} geolocation"),
                Check::href(
                    &equipment(&format!("{}/wmdr:geopositioningMethod", location)),
                    "GeopositioningMethod",
                    "deployment number {n} geopositioning method",
                ),
            ],
        ),
        SubRule::new(
            "3-1-18",
            "Instrument operating status",
            vec![
                Check::href(
                    &deployment(&format!("{}/wmdr:instrumentOperatingStatus", status)),
                    "InstrumentOperatingStatus",
                    "deployment number {n} instrument operating status",
                ),
                Check::text(
                    &deployment(&format!("{}/wmdr:validPeriod/gml:TimePeriod/gml:beginPosition", status)),
                    ValueKind::DateTime,
                    "deployment number {n} valid begin position of time period",
                ),
            ],
        ),
        SubRule::new(
            "3-1-19",
            "Firmware version",
            vec![Check::string(&equipment("wmdr:firmwareVersion"), "deployment number {n} firmware version")],
        ),
        SubRule::new(
            "3-1-20",
            "Observable range",
            vec![Check::string(&equipment("wmdr:observableRange"), "deployment number {n} observable range")],
        ),
        SubRule::new(
            "3-1-21",
            "Uncertainty",
            vec![
                Check::string(&equipment("wmdr:specifiedRelativeUncertainty"), "deployment number {n} specified relative uncertainty"),
                Check::string(&equipment("wmdr:specifiedAbsoluteUncertainty"), "deployment number {n} specified absolute uncertainty"),
            ],
        ),
        SubRule::new(
            "3-1-22",
            "Drift per unit time",
            vec![Check::string(&equipment("wmdr:driftPerUnitTime"), "deployment number {n} drift per unit time")],
        ),
        SubRule::new(
            "3-1-23",
            "Specification URL",
            vec![Check::text(&equipment("wmdr:specificationLink"), ValueKind::Url, "deployment number {n} specification link")],
        ),
        SubRule::new(
            "3-1-24",
            "Uncertainty evaluation procedure",
            vec![Check::href(
                &equipment("wmdr:uncertaintyEvalProc"),
                "UncertaintyEstimateProcedure",
                "deployment number {n} uncertainty estimated procedure",
            )],
        ),
    ]
}

fn frequency_pair() -> Check {
    Check::AllOf(vec![
        Check::string(&frequencies("wmdr:frequency"), "deployment number {n} frequency"),
        Check::string(&frequencies("wmdr:frequencyUnit"), "deployment number {n} frequency unit"),
    ])
}

fn bandwidth_pair() -> Check {
    Check::AllOf(vec![
        Check::string(&frequencies("wmdr:bandwidth"), "deployment number {n} band width"),
        Check::string(&frequencies("wmdr:bandwidthUnit"), "deployment number {n} band width unit"),
    ])
}

fn frequency_use() -> Check {
    Check::href(&frequencies("wmdr:frequencyUse"), "FrequencyUse", "deployment number {n} frequency use")
}

fn purpose_gate(purpose: &'static str, checks: Vec<Check>) -> Check {
    Check::Gated {
        gate: PathExpr::new(&frequencies("wmdr:purposeOfFrequencyUse")),
        codelist: "PurposeOfFrequencyUse",
        label: "deployment number {n} purpose of frequency use",
        purpose,
        checks,
    }
}

/// 3-1-25 .. 3-1-27
fn frequency_rules() -> Vec<SubRule> {
    vec![
        SubRule::new(
            "3-1-25",
            "Observation frequency and polarization",
            vec![purpose_gate(
                "observation",
                vec![
                    frequency_use(),
                    frequency_pair(),
                    bandwidth_pair(),
                    Check::href(&frequencies("wmdr:transmissionMode"), "TransmissionMode", "deployment number {n} transmission mode"),
                    Check::href(&frequencies("wmdr:polarization"), "Polarization", "deployment number {n} polarization"),
                ],
            )],
        ),
        SubRule::new(
            "3-1-26",
            "Telecommunication frequency",
            vec![purpose_gate("telecomms", vec![frequency_use(), bandwidth_pair(), frequency_pair()])],
        ),
        SubRule::new(
            "3-1-27",
            "Data generation",
            vec![Check::Present {
                path: PathExpr::new(&deployment("wmdr:dataGeneration")),
                label: "deployment number {n} data generation",
                found: Some("deployment number {n} data generation specified"),
            }],
        ),
    ]
}
