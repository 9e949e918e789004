//! KPI-3-3 data generation, evaluated per `wmdr:DataGeneration`

use super::RubricSettings;
use crate::rubric::{Check, SubRule};
use crate::validate::ValueKind;

/// Path of a data generation below an observation
pub(super) const INSTANCE_PATH: &str = "om:procedure/wmdr:Process/wmdr:deployment/wmdr:Deployment/wmdr:dataGeneration/wmdr:DataGeneration";

const SAMPLING: &str = "./wmdr:sampling/wmdr:Sampling";
const PROCESSING: &str = "./wmdr:processing/wmdr:Processing";
const REPORTING: &str = "./wmdr:reporting/wmdr:Reporting";

fn sampling(path: &str) -> String {
    format!("{}/{}", SAMPLING, path)
}

fn processing(path: &str) -> String {
    format!("{}/{}", PROCESSING, path)
}

fn reporting(path: &str) -> String {
    format!("{}/{}", REPORTING, path)
}

fn single(code: &'static str, name: &'static str, check: Check) -> SubRule {
    SubRule::new(code, name, vec![check])
}

pub(super) fn sub_rules(settings: &RubricSettings) -> Vec<SubRule> {
    let mut rules = sampling_rules(settings);
    rules.extend(processing_rules(settings));
    rules.extend(reporting_rules());
    rules.extend(policy_rules());
    rules
}

/// 3-3-00 .. 3-3-05
fn sampling_rules(settings: &RubricSettings) -> Vec<SubRule> {
    vec![
        single(
            "3-3-00",
            "Sampling strategy",
            Check::href(&sampling("wmdr:samplingStrategy"), "SamplingStrategy", "data generation number {n} sampling strategy"),
        ),
        single(
            "3-3-01",
            "Sampling interval",
            Check::text(&sampling("wmdr:temporalSamplingInterval"), ValueKind::Duration, "data generation number {n} temporalSamplingInterval"),
        ),
        single(
            "3-3-02",
            "Sampling period",
            Check::text(&sampling("wmdr:samplingTimePeriod"), ValueKind::Duration, "data generation number {n} samplingTimePeriod"),
        ),
        single(
            "3-3-03",
            "Spatial sampling resolution",
            Check::AllOf(vec![
                Check::attribute(
                    &sampling("wmdr:spatialSamplingResolution"),
                    "uom",
                    "unit",
                    "data generation number {n} spatialSamplingResolution uom",
                ),
                Check::text(
                    &sampling("wmdr:spatialSamplingResolution"),
                    ValueKind::Float,
                    "data generation number {n} spatialSamplingResolution value",
                ),
            ]),
        ),
        SubRule::new(
            "3-3-04",
            "Sampling procedure",
            vec![
                Check::href(&sampling("wmdr:samplingProcedure"), "SamplingProcedure", "data generation number {n} samplingProcedure"),
                Check::string_min(
                    &sampling("wmdr:samplingProcedureDescription"),
                    "data generation number {n} samplingProcedureDescription",
                    settings.procedure_description_min_length,
                ),
            ],
        ),
        single(
            "3-3-05",
            "Sample treatment",
            Check::href(&sampling("wmdr:sampleTreatment"), "SampleTreatment", "data generation number {n} samplingTreatment"),
        ),
    ]
}

/// 3-3-06 .. 3-3-10
fn processing_rules(settings: &RubricSettings) -> Vec<SubRule> {
    vec![
        single(
            "3-3-06",
            "Aggregation period",
            Check::text(&processing("wmdr:aggregationPeriod"), ValueKind::Duration, "data generation number {n} processing aggregationPeriod"),
        ),
        single(
            "3-3-07",
            "Data processing method",
            Check::string_min(
                &processing("wmdr:dataProcessing"),
                "data generation number {n} dataProcessing",
                settings.procedure_description_min_length,
            ),
        ),
        single(
            "3-3-08",
            "Software/processor and version",
            Check::string(&processing("wmdr:softwareDetails"), "data generation number {n} softwareDetails"),
        ),
        single(
            "3-3-09",
            "Software/source code repository URL",
            Check::text(&processing("wmdr:softwareURL"), ValueKind::Url, "data generation number {n} softwareURL"),
        ),
        single(
            "3-3-10",
            "Processing/analysis centre",
            Check::string(&processing("wmdr:processingCentre"), "data generation number {n} processingCentre"),
        ),
    ]
}

/// 3-3-12 .. 3-3-22 and 3-3-26
fn reporting_rules() -> Vec<SubRule> {
    vec![
        single(
            "3-3-12",
            "Number of observations in reporting period",
            Check::text(
                &reporting("wmdr:numberOfObservationsInReportingInterval"),
                ValueKind::Integer,
                "data generation number {n} numberOfObservationsInReportingInterval",
            ),
        ),
        single("3-3-13", "Measurement unit", Check::href(&reporting("wmdr:uom"), "unit", "data generation number {n} reporting uom")),
        single(
            "3-3-14",
            "Data policy",
            Check::href(&reporting("wmdr:dataPolicy/wmdr:DataPolicy/wmdr:dataPolicy"), "DataPolicy", "data generation number {n} DataPolicy"),
        ),
        single(
            "3-3-15",
            "Spatial reporting interval",
            Check::string(&reporting("wmdr:spatialReportingInterval"), "data generation number {n} spatialReportingInterval"),
        ),
        single(
            "3-3-16",
            "Timeliness",
            Check::text(&reporting("wmdr:timeliness"), ValueKind::Duration, "data generation number {n} timeliness"),
        ),
        single(
            "3-3-17",
            "Numerical resolution",
            Check::text(&reporting("wmdr:numericalResolution"), ValueKind::Integer, "data generation number {n} numericalResolution"),
        ),
        single("3-3-18", "Level of data", Check::href(&reporting("wmdr:levelOfData"), "LevelOfData", "data generation number {n} levelOfData")),
        single("3-3-19", "Data format", Check::href(&reporting("wmdr:dataFormat"), "DataFormat", "data generation number {n} dataFormat")),
        single(
            "3-3-20",
            "Data format version",
            Check::string(&reporting("wmdr:dataFormatVersion"), "data generation number {n} dataFormatVersion"),
        ),
        single(
            "3-3-21",
            "Reference datum",
            Check::string(&reporting("wmdr:referenceDatum/gml:VerticalDatum/gml:remarks"), "data generation number {n} referenceDatum"),
        ),
        single(
            "3-3-22",
            "Reference time source",
            Check::href(&reporting("wmdr:referenceTimeSource"), "ReferenceTime", "data generation number {n} referenceTimeSource"),
        ),
        single(
            "3-3-26",
            "Meaning of timestamp in data reports",
            Check::href(&reporting("wmdr:timeStampMeaning"), "TimeStampMeaning", "data generation number {n} timeStampMeaning"),
        ),
    ]
}

/// 3-3-27
fn policy_rules() -> Vec<SubRule> {
    let attribution = |path: &str| reporting(&format!("wmdr:dataPolicy/wmdr:DataPolicy/wmdr:attribution/wmdr:Attribution/{}", path));

    vec![single(
        "3-3-27",
        "Attribution",
        Check::AllOf(vec![
            Check::string(&attribution("wmdr:title"), "data generation number {n} attribution title"),
            Check::text(
                &attribution("wmdr:originatorURL/gmd:CI_OnlineResource/gmd:linkage/gmd:URL"),
                ValueKind::Url,
                "data generation number {n} originatorURL",
            ),
            Check::string(
                &attribution("wmdr:originator/gmd:CI_ResponsibleParty/gmd:organizationName/gco:CharacterString"),
                "data generation number {n} originator",
            ),
            Check::text(
                &attribution("wmdr:source/gmd:CI_OnlineResource/gmd:linkage/gmd:URL"),
                ValueKind::Url,
                "data generation number {n} attribution source",
            ),
        ]),
    )]
}
