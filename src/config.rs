use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    effects::timestamp::{DEFAULT_FONT_SIZE, DEFAULT_MARGIN},
    error::{ConfigError, Result},
};

/// Main configuration for the retro camera
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where rolls and the roll registry live
    pub storage: StorageConfig,

    /// Retro effect parameters
    pub effect: EffectConfig,

    /// Encoded photo settings
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.storage.validate()?;
        self.effect.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

/// Photo storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one sub-directory per roll
    pub root: PathBuf,

    /// Registry file name, relative to `root` unless absolute
    pub registry_file: PathBuf,

    /// Keep a roll's photos on disk when the roll is deleted
    pub retain_photos_on_delete: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("photos"),
            registry_file: PathBuf::from("rolls.toml"),
            retain_photos_on_delete: false,
        }
    }
}

impl StorageConfig {
    /// Resolved location of the registry file
    pub fn registry_path(&self) -> PathBuf {
        self.root.join(&self.registry_file)
    }

    fn validate(&self) -> Result<()> {
        if self.registry_file.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "storage.registry_file".to_string(),
                value: String::new()
            }.into());
        }

        Ok(())
    }
}

/// Retro effect configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Saturation factor, must boost (> 1.0)
    pub saturation: f32,

    /// Exclusive upper bound of the per-pixel grain offset
    pub noise_max: u8,

    /// Blue channel factor for the warm cast (0.0-1.0 exclusive)
    pub blue_scale: f32,

    /// Pin the grain RNG; unseeded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grain_seed: Option<u64>,

    /// Date imprint settings
    pub timestamp: TimestampConfig,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            saturation: 1.2,
            noise_max: 40,
            blue_scale: 0.9,
            grain_seed: None,
            timestamp: TimestampConfig::default(),
        }
    }
}

impl EffectConfig {
    fn validate(&self) -> Result<()> {
        if !(self.saturation > 1.0 && self.saturation.is_finite()) {
            return Err(ConfigError::InvalidValue {
                key: "effect.saturation".to_string(),
                value: self.saturation.to_string()
            }.into());
        }

        if self.noise_max == 0 {
            return Err(ConfigError::InvalidValue {
                key: "effect.noise_max".to_string(),
                value: self.noise_max.to_string()
            }.into());
        }

        if !(self.blue_scale > 0.0 && self.blue_scale < 1.0) {
            return Err(ConfigError::InvalidValue {
                key: "effect.blue_scale".to_string(),
                value: self.blue_scale.to_string()
            }.into());
        }

        self.timestamp.validate()
    }
}

/// Date imprint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampConfig {
    /// Draw the date in the bottom-right corner
    pub enabled: bool,

    /// Text size in pixels
    pub font_size: f32,

    /// Inset of the text's right edge and baseline from the image border (pixels)
    pub margin: u32,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            font_size: DEFAULT_FONT_SIZE,
            margin: DEFAULT_MARGIN,
        }
    }
}

impl TimestampConfig {
    fn validate(&self) -> Result<()> {
        if !(self.font_size >= 4.0 && self.font_size.is_finite()) {
            return Err(ConfigError::InvalidValue {
                key: "effect.timestamp.font_size".to_string(),
                value: self.font_size.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Encoded output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,

    /// Prefix of stored photo filenames
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 100,
            file_prefix: "retro_".to_string(),
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidValue {
                key: "output.jpeg_quality".to_string(),
                value: self.jpeg_quality.to_string()
            }.into());
        }

        if self.file_prefix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                key: "output.file_prefix".to_string(),
                value: self.file_prefix.clone()
            }.into());
        }

        Ok(())
    }
}
