//! Configuration and settings management for plotkit
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Machine profile (kinematics, bed, pen heights, flattening heuristics)
//! - Tracing filter options handed to the vectorizer
//! - Output locations for the toolpath and previews

use crate::error::{ConfigError, SettingsError, SettingsResult};
use plotkit_core::{FilterConfig, MachineProfile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where pipeline artifacts are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Emitted toolpath program
    pub gcode_path: PathBuf,
    /// Directory receiving `rendered-output.png` / `rendered-output.svg`
    pub preview_dir: PathBuf,
    /// Scratch directory for intermediate tracer files
    pub work_dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            gcode_path: PathBuf::from("output/gcode-output.gcode"),
            preview_dir: PathBuf::from("tmp"),
            work_dir: PathBuf::from("tmp"),
        }
    }
}

/// Complete pipeline configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Target machine
    pub profile: MachineProfile,
    /// Bitmap tracing options
    pub filter: FilterConfig,
    /// Output locations
    pub output: OutputSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match Format::from_path(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load config from `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::from_path(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e)))?;
        }

        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.profile.validate()?;

        let filter = [
            ("filter.highpass", self.filter.highpass),
            ("filter.blur", self.filter.blur),
            ("filter.corner_threshold", self.filter.corner_threshold),
        ];
        for (key, value) in filter {
            if !(value >= 0.0) {
                return Err(ConfigError::ValueOutOfRange {
                    key: key.to_string(),
                    value: value.to_string(),
                }
                .into());
            }
        }

        if self.output.gcode_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("output.gcode_path".to_string()).into());
        }
        if self.output.preview_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("output.preview_dir".to_string()).into());
        }

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )
            .into()),
        }
    }
}

/// Platform-specific default location of the config file
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("plotkit").join("config.toml"))
        .ok_or_else(|| {
            SettingsError::ConfigDirectory("no configuration directory on this platform".into())
        })
}
