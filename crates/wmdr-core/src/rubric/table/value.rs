//! KPI-6-0 value of a station for WIGOS

use super::FACILITY;
use crate::document::PathExpr;
use crate::rubric::{Band, Check, SubRule};

pub(super) fn sub_rules() -> Vec<SubRule> {
    vec![
        SubRule::new(
            "6-0-00",
            "Program affiliation",
            vec![Check::DistinctReferenceBands {
                path: PathExpr::new(&format!(
                    "{}/wmdr:programAffiliation/wmdr:ProgramAffiliation/wmdr:programAffiliation",
                    FACILITY
                )),
                codelist: "ProgramAffiliation",
                label: "program affiliation",
                bands: vec![
                    Band::new(5, 3, None),
                    Band::new(3, 2, Some("found 4-5 program affiliation (goal >5)")),
                    Band::new(1, 1, Some("found 2-3 program affiliation (goal >5)")),
                ],
                below: "found 0-1 program affiliation (goal >5)",
            }],
        ),
        SubRule::new(
            "6-0-01",
            "Observations / measurements",
            vec![Check::CountBands {
                path: PathExpr::new("//wmdr:observation/wmdr:ObservingCapability/wmdr:observation"),
                label: "observation",
                bands: vec![
                    Band::new(10, 3, None),
                    Band::new(5, 2, Some("found 6-10 observation (goal >10)")),
                    Band::new(1, 1, Some("found 2-5 observation (goal >10)")),
                ],
                below: "found 1 observation (goal >10)",
            }],
        ),
        SubRule::new(
            "6-0-02",
            "Application areas",
            vec![Check::DistinctReferencesAtLeast {
                path: PathExpr::new("./wmdr:applicationArea"),
                codelist: "ApplicationArea",
                label: "application area",
                minimum: 2,
                shortfall: "found 0-1 valid application area (goal >1)",
            }],
        )
        .over_instances("//wmdr:deployment/wmdr:Deployment", "deployment"),
        SubRule::new(
            "6-0-03",
            "Near real time availability",
            vec![Check::NearRealTime {
                label: "end position of deployment valid period",
            }],
        )
        .over_instances(
            "//wmdr:deployment/wmdr:Deployment/wmdr:validPeriod/gml:TimePeriod/gml:endPosition",
            "end position of deployment valid period",
        ),
    ]
}
