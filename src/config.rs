//! Configuration for a gaze scratch analysis run.

use crate::core::aoi::{AoiBounds, ScreenGeometry};
use crate::core::fixation::DetectorParams;
use crate::core::inclusion::InclusionCriteria;
use crate::core::phases::PhaseTiming;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for one participant and condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Participant identifier used in output file names
    pub participant_id: String,

    /// Condition label, e.g. "Rise" or "Drop"
    pub condition: String,

    /// Directory holding one recording file per trial
    pub input_dir: PathBuf,

    /// Directory for the per-phase aggregate tables and the run summary
    pub aggregate_dir: PathBuf,

    /// Directory for the per-trial fixation tables
    pub fixation_dir: PathBuf,

    pub detector: DetectorParams,

    pub phases: PhaseTiming,

    pub inclusion: InclusionCriteria,

    /// Screen size, used for the vertical flip before detection
    pub screen: ScreenGeometry,

    pub aoi: AoiBounds,

    /// What to do with a fixation table that has no rows
    pub empty_fixation_tables: EmptyTablePolicy,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gaze-scratch-analysis");

        Self {
            participant_id: "P01".to_string(),
            condition: "Rise".to_string(),
            input_dir: data_dir.join("recordings"),
            aggregate_dir: data_dir.join("results"),
            fixation_dir: data_dir.join("fixations"),
            detector: DetectorParams::default(),
            phases: PhaseTiming::default(),
            inclusion: InclusionCriteria::default(),
            screen: ScreenGeometry::default(),
            aoi: AoiBounds::default(),
            empty_fixation_tables: EmptyTablePolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file. Missing fields take their defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gaze-scratch-analysis")
            .join("config.json")
    }

    /// Ensure the output directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.aggregate_dir)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        std::fs::create_dir_all(&self.fixation_dir)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Check that the values describe a usable analysis.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.participant_id.trim().is_empty() {
            return Err(invalid("participant_id must not be empty"));
        }
        if self.condition.trim().is_empty() {
            return Err(invalid("condition must not be empty"));
        }

        let d = &self.detector;
        if !d.max_dispersion.is_finite() || d.max_dispersion < 0.0 {
            return Err(invalid("detector.max_dispersion must be a finite non-negative number"));
        }
        if !d.min_duration.is_finite() || d.min_duration < 0.0 {
            return Err(invalid("detector.min_duration must be a finite non-negative number"));
        }

        let p = &self.phases;
        if !(p.baseline_start < p.baseline_end) {
            return Err(invalid("phases.baseline_start must be before phases.baseline_end"));
        }
        if !(p.disruption_window > 0.0) {
            return Err(invalid("phases.disruption_window must be positive"));
        }

        if !(self.inclusion.sample_rate_hz > 0.0) {
            return Err(invalid("inclusion.sample_rate_hz must be positive"));
        }
        if !(self.screen.width > 0.0 && self.screen.height > 0.0) {
            return Err(invalid("screen dimensions must be positive"));
        }
        if !self.aoi.is_well_formed() {
            return Err(invalid(
                "aoi bounds must satisfy x_low <= x_high and y_low <= y_high",
            ));
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Invalid(msg.to_string())
}

/// Policy for fixation tables without rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyTablePolicy {
    /// Do not create the file
    #[default]
    Skip,
    /// Write a header-only file
    Write,
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.detector.max_dispersion, 25.0);
        assert_eq!(config.detector.min_duration, 0.25);
        assert_eq!(config.phases.baseline_start, 4.0);
        assert_eq!(config.phases.baseline_end, 9.0);
        assert_eq!(config.phases.disruption_window, 5.0);
        assert_eq!(config.inclusion.contingent, 10.0);
        assert_eq!(config.screen.height, 1024.0);
        assert_eq!(config.aoi.x_low, 478.0);
        assert_eq!(config.empty_fixation_tables, EmptyTablePolicy::Skip);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("config.json");

        let mut config = Config::default();
        config.participant_id = "ID_52b".to_string();
        config.condition = "Drop".to_string();
        config.empty_fixation_tables = EmptyTablePolicy::Write;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"participant_id": "ID_7", "detector": {"max_dispersion": 30.0}, "empty_fixation_tables": "write"}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.participant_id, "ID_7");
        assert_eq!(config.condition, "Rise");
        assert_eq!(config.detector.max_dispersion, 30.0);
        assert_eq!(config.detector.min_duration, 0.25);
        assert_eq!(config.empty_fixation_tables, EmptyTablePolicy::Write);
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.participant_id = " ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.phases.baseline_start = 9.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.detector.min_duration = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.aoi.x_low = 900.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.inclusion.sample_rate_hz = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_quadrant_layout_is_valid() {
        let mut config = Config::default();
        config.aoi = AoiBounds::screen_quadrants(&config.screen);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ensure_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.aggregate_dir = dir.path().join("out").join("dur");
        config.fixation_dir = dir.path().join("out").join("fix");
        config.ensure_directories().unwrap();

        assert!(config.aggregate_dir.is_dir());
        assert!(config.fixation_dir.is_dir());
    }
}
