//! Configuration type definitions

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::rubric::AggregationPolicy;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "wmdr.toml";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Resource directory holding `codelists/` and `maps/` (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<PathBuf>,

    /// Scoring thresholds
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Aggregation policy overrides keyed by rule or sub-rule id
    #[serde(default)]
    pub policies: BTreeMap<String, AggregationPolicy>,
}

/// Thresholds used by individual rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// How long after a deployment's end position it still counts as real time
    #[serde(default = "default_near_real_time_hours")]
    pub near_real_time_hours: u32,

    #[serde(default = "default_site_description_min_length")]
    pub site_description_min_length: usize,

    #[serde(default = "default_event_description_min_length")]
    pub event_description_min_length: usize,

    /// Sampling procedure and data processing descriptions
    #[serde(default = "default_procedure_description_min_length")]
    pub procedure_description_min_length: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            near_real_time_hours: default_near_real_time_hours(),
            site_description_min_length: default_site_description_min_length(),
            event_description_min_length: default_event_description_min_length(),
            procedure_description_min_length: default_procedure_description_min_length(),
        }
    }
}

fn default_near_real_time_hours() -> u32 {
    24
}

fn default_site_description_min_length() -> usize {
    300
}

fn default_event_description_min_length() -> usize {
    100
}

fn default_procedure_description_min_length() -> usize {
    50
}
