//! Renderer configuration with defaults and RON persistence.

use std::path::{Path, PathBuf};

use aether_atmosphere::AtmosphereParameters;
use aether_compositor::PassSettings;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the persisted configuration.
pub const CONFIG_FILE: &str = "config.ron";

/// Directory name under the platform config directory.
pub const APP_DIR: &str = "aether";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Output image settings.
    pub render: RenderConfig,
    /// Camera orientation.
    pub camera: CameraConfig,
    /// Main light placement.
    pub sun: SunConfig,
    /// Atmosphere settings resolved for the camera.
    pub atmosphere: AtmosphereParameters,
    /// Sky atmosphere pass settings.
    pub pass: PassSettings,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Output image configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
    /// Where the composited PNG is written.
    pub output: PathBuf,
    /// Exposure applied when tonemapping to 8 bits.
    pub exposure: f32,
}

/// Camera configuration. Angles are in degrees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view.
    pub fov_y_deg: f32,
    /// Rotation above the horizon.
    pub pitch_deg: f32,
    /// Rotation about the zenith.
    pub yaw_deg: f32,
}

/// Sun placement. Angles are in degrees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SunConfig {
    /// Angle above the horizon. Negative puts the sun below it.
    pub elevation_deg: f32,
    /// Angle clockwise from the default camera forward.
    pub azimuth_deg: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            output: PathBuf::from("sky.png"),
            exposure: 10.0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 60.0,
            pitch_deg: 10.0,
            yaw_deg: 0.0,
        }
    }
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            elevation_deg: 20.0,
            azimuth_deg: 0.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Persistence ---

impl Config {
    /// Default config directory: `<platform config dir>/aether`.
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Location of the config file inside `config_dir`.
    pub fn file_in(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE)
    }

    /// Parse a RON document. Missing sections and fields take their defaults.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(ConfigError::ParseError)
    }

    /// Pretty RON, one setting per line.
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)
    }

    /// Load `config.ron` from `config_dir`. A missing file is replaced by the
    /// defaults, which are written back so the user has something to edit.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::file_in(config_dir);
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                let config = Self::from_ron(&text)?;
                log::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.save(config_dir)?;
                log::info!("Wrote default config to {}", path.display());
                Ok(config)
            }
            Err(err) => Err(ConfigError::ReadError(err)),
        }
    }

    /// Write `config.ron` into `config_dir`, creating the directory if needed.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let text = self.to_ron()?;
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;
        std::fs::write(Self::file_in(config_dir), text).map_err(ConfigError::WriteError)
    }
}
