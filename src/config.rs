//! Configuration file handling for falsecolor.
//!
//! Loads configuration from `<config_dir>/falsecolor/config.toml` or a custom path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::camera::SourceSettings;
use crate::exposure::{ExposureFormula, HardwareCaps, ValueRange};
use crate::snapshot::AnnotatorConfig;
use crate::viewport::Orientation;

/// Configuration file structure for falsecolor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub controls: ControlsConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub exposure: ExposureConfig,
}

/// What the (simulated) hardware reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// `[lower, upper]` ISO
    pub iso_range: [u32; 2],
    /// `[lower, upper]` exposure time in nanoseconds
    pub exposure_range_ns: [u64; 2],
    pub apertures: Vec<f32>,
    /// Mounting rotation in degrees (0, 90, 180, 270)
    pub orientation: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            iso_range: [100, 1600],
            exposure_range_ns: [1_000_000, 500_000_000],
            apertures: vec![1.8],
            orientation: 90,
            width: 640,
            height: 480,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Largest control position
    pub max_progress: u32,
    /// Positions moved per key press
    pub step: u32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            max_progress: 5000,
            step: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub fps: u32,
    pub initial_gain: f32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            initial_gain: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub legend_width: u32,
    /// Where captured stills are written
    pub output_dir: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            legend_width: 190,
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExposureConfig {
    pub formula: ExposureFormula,
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// Without an explicit path the default location is used, and a missing
    /// file there yields the defaults. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_path(), false),
        };

        if !explicit && !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read {
            path: path.clone(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            source: e,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Hardware capabilities. An inverted range counts as not reported.
    pub fn hardware_caps(&self) -> HardwareCaps {
        let [iso_lower, iso_upper] = self.sensor.iso_range;
        let [exp_lower, exp_upper] = self.sensor.exposure_range_ns;
        let iso_range = ValueRange::new(iso_lower, iso_upper);
        let exposure_range = ValueRange::new(exp_lower, exp_upper);
        if iso_range.is_none() {
            log::warn!("Ignoring inverted ISO range {:?}", self.sensor.iso_range);
        }
        if exposure_range.is_none() {
            log::warn!(
                "Ignoring inverted exposure range {:?}",
                self.sensor.exposure_range_ns
            );
        }
        HardwareCaps {
            iso_range,
            exposure_range,
            apertures: self.sensor.apertures.clone(),
            orientation: self.orientation(),
        }
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::from_degrees(self.sensor.orientation)
    }

    pub fn source_settings(&self) -> SourceSettings {
        SourceSettings {
            width: self.sensor.width,
            height: self.sensor.height,
            fps: self.preview.fps.max(1),
            orientation: self.orientation(),
        }
    }

    pub fn annotator_config(&self) -> AnnotatorConfig {
        AnnotatorConfig {
            legend_width: self.snapshot.legend_width,
            ..AnnotatorConfig::default()
        }
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Errors that can occur when loading or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to write config file '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("falsecolor").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/falsecolor/config.toml")
        })
}

/// Template written by `config init`.
pub const DEFAULT_CONFIG: &str = r#"# falsecolor configuration

[sensor]
# Supported ISO range [lower, upper]
iso_range = [100, 1600]
# Supported exposure time range in nanoseconds [lower, upper]
exposure_range_ns = [1000000, 500000000]
# Aperture f-numbers; only the first is used
apertures = [1.8]
# Sensor mounting rotation in degrees: 0, 90, 180, 270
orientation = 90
# Synthetic frame size
width = 640
height = 480

[controls]
# Control positions run from 0 to max_progress
max_progress = 5000
# Positions moved per key press
step = 100

[preview]
fps = 30
# Preview gain before the brightness control is touched (0.5 - 2.0)
initial_gain = 1.0

[snapshot]
# Width of the luminance legend in pixels
legend_width = 190
# Directory captured stills are written to
output_dir = "."

[exposure]
# Exposure quantity: "iso-time" (ISO x t) or "iso-time-aperture" (ISO x t / N^2)
formula = "iso-time"
"#;

/// Write [`DEFAULT_CONFIG`] to `path`, refusing to overwrite.
pub fn init_config(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, DEFAULT_CONFIG).map_err(|e| ConfigError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}
