//! Configuration file handling for WallKit
//!
//! A configuration holds the conversion parameters and the default output
//! file names. Files are TOML or JSON, chosen by extension; missing keys take
//! their default values, so a file only needs the settings it changes.
//!
//! ```toml
//! [plotter]
//! span_mm = 2400.0
//! fit_fraction = 0.6
//!
//! [output]
//! drawing = "drawing.gcode"
//! ```

use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use wallkit_core::PlotterParameters;

/// Default drawing program file name.
pub const DEFAULT_DRAWING_FILE: &str = "drawing.gcode";
/// Default calibration program file name.
pub const DEFAULT_CALIBRATION_FILE: &str = "bbox_dots.gcode";

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Format implied by a file's extension.
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            _ => Err(SettingsError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Where generated programs are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Drawing program
    pub drawing: PathBuf,
    /// Calibration (bounding-box dots) program
    pub calibration: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            drawing: PathBuf::from(DEFAULT_DRAWING_FILE),
            calibration: PathBuf::from(DEFAULT_CALIBRATION_FILE),
        }
    }
}

/// Complete WallKit configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Conversion parameters
    pub plotter: PlotterParameters,
    /// Output files
    pub output: OutputSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config_dir>/wallkit/config.toml` for the current platform.
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("wallkit").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::LoadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the config at `path` if it exists, otherwise the defaults.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML), creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| SettingsError::SaveError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.plotter.validate()?;

        if self.output.drawing.as_os_str().is_empty() {
            return Err(invalid("output.drawing", "must not be empty"));
        }
        if self.output.calibration.as_os_str().is_empty() {
            return Err(invalid("output.calibration", "must not be empty"));
        }
        if self.output.drawing == self.output.calibration {
            return Err(invalid(
                "output.calibration",
                "must differ from output.drawing",
            ));
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: &str) -> SettingsError {
    SettingsError::InvalidSetting {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.drawing, PathBuf::from("drawing.gcode"));
        assert_eq!(config.output.calibration, PathBuf::from("bbox_dots.gcode"));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("a/b.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("c.JSON")).unwrap(),
            ConfigFormat::Json
        );
        assert!(matches!(
            ConfigFormat::from_path(Path::new("c.yaml")),
            Err(SettingsError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [plotter]
            span_mm = 2400.0
            lift_between_paths = true
            "#,
        )
        .unwrap();
        assert_eq!(config.plotter.span_mm, 2400.0);
        assert!(config.plotter.lift_between_paths);
        assert_eq!(config.plotter.fit_fraction, 0.70);
        assert_eq!(config.output, OutputSettings::default());
    }

    #[test]
    fn test_validate_rejects_clashing_outputs() {
        let mut config = Config::new();
        config.output.calibration = config.output.drawing.clone();
        match config.validate() {
            Err(SettingsError::InvalidSetting { key, .. }) => {
                assert_eq!(key, "output.calibration")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_bad_plotter_values() {
        let mut config = Config::new();
        config.plotter.draw_step_mm = 0.0;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::Parameter(_))
        ));
    }

    #[test]
    fn test_default_path_ends_with_app_dir() {
        if let Ok(path) = Config::default_path() {
            assert!(path.ends_with("wallkit/config.toml"));
        }
    }
}
