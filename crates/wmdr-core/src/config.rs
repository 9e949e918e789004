//! Engine configuration for wmdr
//!
//! Read from `wmdr.toml` in the working directory or an explicit `--config`
//! path. Every setting has a default, so an absent file is not an error.

pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use tracing::debug;

use crate::bail_invalid;
use crate::error::{Result, WmdrError};
use crate::rubric::table::RubricSettings;
use crate::rubric::{EvaluationOptions, Rubric};

pub use types::{EngineConfig, ThresholdConfig, CONFIG_FILE};

const RESOURCES_DIR: &str = ".wmdr";
const RESOURCES_DIR_ENV_VAR: &str = "WMDR_RESOURCES";

impl EngineConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| WmdrError::io_operation("read config", path.display(), e))?;
        let config: EngineConfig = toml::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load `explicit`, else `wmdr.toml` in `dir` if present, else defaults
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Self::load(&candidate);
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        let thresholds = &self.thresholds;
        if thresholds.near_real_time_hours == 0 {
            bail_invalid!("near_real_time_hours", "must be at least 1");
        }
        if thresholds.site_description_min_length == 0 {
            bail_invalid!("site_description_min_length", "must be at least 1");
        }
        if thresholds.event_description_min_length == 0 {
            bail_invalid!("event_description_min_length", "must be at least 1");
        }
        if thresholds.procedure_description_min_length == 0 {
            bail_invalid!("procedure_description_min_length", "must be at least 1");
        }
        Ok(())
    }

    pub fn rubric_settings(&self) -> RubricSettings {
        RubricSettings {
            site_description_min_length: self.thresholds.site_description_min_length,
            event_description_min_length: self.thresholds.event_description_min_length,
            procedure_description_min_length: self.thresholds.procedure_description_min_length,
        }
    }

    /// The standard rubric with configured thresholds and policy overrides
    pub fn rubric(&self) -> Result<Rubric> {
        Rubric::standard(&self.rubric_settings()).with_policy_overrides(&self.policies)
    }

    pub fn evaluation_options(&self) -> EvaluationOptions {
        EvaluationOptions {
            near_real_time_window: TimeDelta::hours(i64::from(self.thresholds.near_real_time_hours)),
            ..EvaluationOptions::default()
        }
    }

    /// Resource directory: configured, then `WMDR_RESOURCES`, then `~/.wmdr`
    pub fn resources_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.resources {
            return Ok(dir.clone());
        }
        if let Ok(dir) = std::env::var(RESOURCES_DIR_ENV_VAR) {
            return Ok(PathBuf::from(dir));
        }
        dirs::home_dir()
            .map(|home| home.join(RESOURCES_DIR))
            .ok_or_else(|| WmdrError::Other("unable to determine home directory".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::AggregationPolicy;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.resources.is_none());
        assert_eq!(config.thresholds.near_real_time_hours, 24);
        assert_eq!(config.thresholds.site_description_min_length, 300);
        assert_eq!(config.thresholds.event_description_min_length, 100);
        assert_eq!(config.thresholds.procedure_description_min_length, 50);
        assert!(config.policies.is_empty());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
resources = "/opt/wmdr"

[thresholds]
near_real_time_hours = 48

[policies]
kpi_31 = "single"
"2-0-12" = "per-instance-additive"
"#,
        )
        .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.resources, Some(PathBuf::from("/opt/wmdr")));
        assert_eq!(config.thresholds.near_real_time_hours, 48);
        assert_eq!(config.thresholds.site_description_min_length, 300);
        assert_eq!(config.policies.get("kpi_31"), Some(&AggregationPolicy::Single));
        assert_eq!(
            config.evaluation_options().near_real_time_window,
            TimeDelta::hours(48)
        );
        assert_eq!(config.resources_dir().unwrap(), PathBuf::from("/opt/wmdr"));

        let rubric = config.rubric().unwrap();
        assert_eq!(
            rubric.rule("kpi_31").unwrap().policy(),
            Some(AggregationPolicy::Single)
        );
    }

    #[test]
    fn test_rejects_zero_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[thresholds]\nnear_real_time_hours = 0\n").unwrap();

        let err = EngineConfig::load(&path).unwrap_err();
        assert!(matches!(err, WmdrError::InvalidValue { .. }));
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[policies]\nkpi_31 = \"sometimes\"\n").unwrap();

        assert!(matches!(EngineConfig::load(&path), Err(WmdrError::Toml(_))));
    }

    #[test]
    fn test_discover_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config, EngineConfig::default());

        fs::write(dir.path().join(CONFIG_FILE), "[thresholds]\nsite_description_min_length = 120\n").unwrap();
        let config = EngineConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.thresholds.site_description_min_length, 120);
        assert_eq!(config.rubric_settings().site_description_min_length, 120);
    }
}
