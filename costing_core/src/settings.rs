//! # Costing Settings
//!
//! Fallback material rates, labour percentage and rounding mode. Settings are
//! plain values handed to the sheet and the calculator; nothing reads them
//! from global state.
//!
//! ## TOML Example
//!
//! ```toml
//! rounding = "precise"
//! store_path = "costings.json"
//!
//! [defaults]
//! copper_rate = 700.0
//! pvc_rate = 100.0
//! labour_on_wire = 12.0
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::calculations::costing::{CostingDefaults, RoundingMode};
use crate::errors::{CostError, CostResult};

/// Settings for a costing sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostingSettings {
    /// How intermediate values are rounded
    pub rounding: RoundingMode,

    /// Sheet file used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    /// Fallbacks for absent or invalid form fields
    pub defaults: CostingDefaults,
}

impl CostingSettings {
    /// Parse settings from TOML text. `origin` names the source in errors.
    pub fn from_toml_str(text: &str, origin: &str) -> CostResult<Self> {
        toml::from_str(text).map_err(|e| CostError::ConfigError {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// Load settings from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> CostResult<Self> {
        match fs::read_to_string(path) {
            Ok(text) => {
                let settings = Self::from_toml_str(&text, &path.display().to_string())?;
                tracing::debug!(path = %path.display(), rounding = ?settings.rounding, "settings loaded");
                Ok(settings)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(CostError::file_error("read", path.display().to_string(), e.to_string())),
        }
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> CostResult<String> {
        toml::to_string_pretty(self).map_err(|e| CostError::serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let settings = CostingSettings::from_toml_str("", "inline").unwrap();
        assert_eq!(settings, CostingSettings::default());
        assert_eq!(settings.defaults.copper_rate, 700.0);
        assert_eq!(settings.defaults.pvc_rate, 100.0);
        assert_eq!(settings.defaults.labour_on_wire, 12.0);
        assert_eq!(settings.rounding, RoundingMode::Precise);
    }

    #[test]
    fn test_partial_defaults_table() {
        let text = "rounding = \"legacy\"\n\n[defaults]\ncopper_rate = 812.5\n";
        let settings = CostingSettings::from_toml_str(text, "inline").unwrap();
        assert_eq!(settings.rounding, RoundingMode::Legacy);
        assert_eq!(settings.defaults.copper_rate, 812.5);
        assert_eq!(settings.defaults.pvc_rate, 100.0);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = CostingSettings::from_toml_str("rounding = 5", "wirecost.toml").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("wirecost_settings_that_do_not_exist.toml");
        assert_eq!(CostingSettings::load(&path).unwrap(), CostingSettings::default());
    }

    #[test]
    fn test_toml_output_parses_back() {
        let mut settings = CostingSettings::default();
        settings.store_path = Some(PathBuf::from("sheets/costings.json"));
        let text = settings.to_toml_string().unwrap();
        assert!(text.contains("[defaults]"));
        assert_eq!(CostingSettings::from_toml_str(&text, "inline").unwrap(), settings);
    }
}
