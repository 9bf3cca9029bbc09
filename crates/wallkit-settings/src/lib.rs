//! WallKit Settings Crate
//!
//! Loads and saves the converter configuration.

pub mod config;
pub mod error;

pub use config::{
    Config, ConfigFormat, OutputSettings, DEFAULT_CALIBRATION_FILE, DEFAULT_DRAWING_FILE,
};
pub use error::{SettingsError, SettingsResult};
