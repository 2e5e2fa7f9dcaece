//! Tunable constants for capture, canvas and the floating layout.
//!
//! Every section uses `#[serde(default)]`, so a config file only needs to
//! name the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::CanvasSize;
use crate::error::ConfigError;
use crate::stroke::BrushSettings;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV_VAR: &str = "DOODLE_TANK_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub canvas: CanvasConfig,
    pub capture: CaptureConfig,
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CanvasConfig {
    pub size: CanvasSize,
    pub brush: BrushSettings,
}

/// Touch filtering thresholds. Hand-tuned, so kept configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Touch contacts with a larger radius are treated as a resting palm.
    pub palm_radius: f32,
    /// A touch-down arriving this soon after the previous touch event is a duplicate.
    pub duplicate_window_ms: f64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            palm_radius: 20.0,
            duplicate_window_ms: 10.0,
        }
    }
}

/// Floating layout bounds. Positions are percentages of the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Range for the initial `left`/`top` of a new item.
    pub spawn_min: f32,
    pub spawn_max: f32,
    /// Reflection bounds; items never leave `[bound_min, bound_max]`.
    pub bound_min: f32,
    pub bound_max: f32,
    /// Speed band in percent per second.
    pub speed_min: f32,
    pub speed_max: f32,
    pub scale_min: f32,
    pub scale_max: f32,
    /// Range of the factor applied to a reflected velocity component.
    pub bounce_min: f32,
    pub bounce_max: f32,
    /// Upper bound on a single tick's time step, in seconds.
    pub max_step_secs: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spawn_min: 5.0,
            spawn_max: 95.0,
            bound_min: 3.0,
            bound_max: 97.0,
            speed_min: 8.0,
            speed_max: 22.0,
            scale_min: 0.9,
            scale_max: 1.3,
            bounce_min: 0.7,
            bounce_max: 1.3,
            max_step_secs: 0.05,
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Load the file named by [`CONFIG_ENV_VAR`], if the variable is set and
    /// the file is usable.
    pub fn from_env() -> Option<Self> {
        let path = std::env::var(CONFIG_ENV_VAR).ok()?;
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {path}");
                Some(config)
            }
            Err(err) => {
                log::warn!("Ignoring config file {path}: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_json_str(r#"{"capture": {"palm_radius": 32.0}}"#).unwrap();
        assert_eq!(config.capture.palm_radius, 32.0);
        assert_eq!(config.capture.duplicate_window_ms, 10.0);
        assert_eq!(config.layout, LayoutConfig::default());
        assert_eq!(config.canvas.size, CanvasSize::new(400.0, 240.0));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(matches!(
            Config::from_json_str("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(matches!(
            Config::load("/definitely/not/here/doodle_tank.json"),
            Err(ConfigError::Read(_))
        ));
    }
}
