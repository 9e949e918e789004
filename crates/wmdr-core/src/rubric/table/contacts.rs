//! KPI-4 station contacts

use super::FACILITY;
use crate::rubric::{AggregationPolicy, Category, Check, InstanceSpec, RuleBody, RuleDescriptor, SubRule};
use crate::validate::ValueKind;

const CONTACT: &str = "./wmdr:ResponsibleParty/wmdr:responsibleParty/gmd:CI_ResponsibleParty/gmd:contactInfo/gmd:CI_Contact";

fn contact(path: &str) -> String {
    format!("{}/{}", CONTACT, path)
}

fn responsible_party() -> String {
    format!("{}/wmdr:responsibleParty", FACILITY)
}

pub(super) fn station_contacts() -> RuleDescriptor {
    RuleDescriptor {
        key: "kpi_40",
        name: "KPI-4-0: Station contacts",
        category: Some(Category::StationContacts),
        body: RuleBody::Checks(vec![SubRule::new(
            "4-0-00",
            "Responsible party",
            vec![Check::present(&responsible_party(), "responsibleParty")],
        )]),
    }
}

pub(super) fn individual_contacts() -> RuleDescriptor {
    RuleDescriptor {
        key: "kpi_41",
        name: "KPI-4-1: Station contact - individual",
        category: Some(Category::StationContacts),
        body: RuleBody::Instances {
            instances: InstanceSpec::new(&responsible_party(), "responsibleParty"),
            policy: AggregationPolicy::AverageOverInstances,
            rules: vec![
                SubRule::new(
                    "4-1-00",
                    "Delivery point",
                    vec![Check::string(
                        &contact("gmd:address/gmd:CI_Address/gmd:deliveryPoint/gco:CharacterString"),
                        "responsible party {n} delivery point",
                    )],
                ),
                SubRule::new(
                    "4-1-01",
                    "Postal code",
                    vec![Check::string(
                        &contact("gmd:address/gmd:CI_Address/gmd:postalCode/gco:CharacterString"),
                        "responsible party {n} postal code",
                    )],
                ),
                SubRule::new(
                    "4-1-02",
                    "Country",
                    vec![Check::string(
                        &contact("gmd:address/gmd:CI_Address/gmd:country/gco:CharacterString"),
                        "responsible party {n} state or province",
                    )],
                ),
                SubRule::new(
                    "4-1-03",
                    "Telephone",
                    vec![Check::string(
                        &contact("gmd:phone/gmd:CI_Telephone/gmd:voice/gco:CharacterString"),
                        "responsible party {n} phone (main or other)",
                    )],
                ),
                SubRule::new(
                    "4-1-04",
                    "Online resource",
                    vec![Check::text(
                        &contact("gmd:onlineResource/gmd:CI_OnlineResource/gmd:linkage/gmd:URL"),
                        ValueKind::Url,
                        "responsible party {n} contact URL",
                    )],
                ),
            ],
        },
    }
}
