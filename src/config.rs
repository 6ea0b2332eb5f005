//! Pipeline configuration
//!
//! Everything the caller supplies: print dimensions, how many images the
//! order needs, the upload size ceiling and crop output size. Stored as JSON;
//! missing fields take their defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::imaging::CropSpec;
use crate::intake::{DecodePolicy, IntakeLimits, DEFAULT_SIZE_LIMIT};
use crate::state::crop::ScanPolicy;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Print width; with `max_height` defines the crop aspect ratio
    pub max_width: u32,
    pub max_height: u32,
    /// Number of images the order needs (session capacity)
    pub max_images: usize,
    /// Largest accepted upload in bytes
    pub size_limit_bytes: u64,
    /// Crop output size in pixels
    pub output_width: u32,
    pub output_height: u32,
    pub scan_policy: ScanPolicy,
    pub decode_policy: DecodePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_width: 1,
            max_height: 1,
            max_images: 3,
            size_limit_bytes: DEFAULT_SIZE_LIMIT,
            output_width: 141,
            output_height: 141,
            scan_policy: ScanPolicy::default(),
            decode_policy: DecodePolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        info!("⚙️  Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from the default location, or fall back to defaults if there is
    /// no file there
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => match Self::load(&path) {
                Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                    debug!("No config at {}, using defaults", path.display());
                    Ok(Self::default())
                }
                result => result,
            },
            None => Ok(Self::default()),
        }
    }

    /// Where the config file lives:
    /// - Linux: ~/.config/photo-intake/config.json
    /// - macOS: ~/Library/Application Support/photo-intake/config.json
    /// - Windows: %APPDATA%\photo-intake\config.json
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("photo-intake");
        path.push("config.json");
        Some(path)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(ConfigError::invalid(format!(
                "print dimensions must be non-zero, got {}x{}",
                self.max_width, self.max_height
            )));
        }
        if self.output_width == 0 || self.output_height == 0 {
            return Err(ConfigError::invalid(format!(
                "crop output size must be non-zero, got {}x{}",
                self.output_width, self.output_height
            )));
        }
        if self.max_images == 0 {
            return Err(ConfigError::invalid("max_images must be at least 1"));
        }
        if self.size_limit_bytes == 0 {
            return Err(ConfigError::invalid("size_limit_bytes must be non-zero"));
        }
        Ok(())
    }

    /// Crop geometry for the session
    pub fn crop_spec(&self) -> CropSpec {
        CropSpec::new(
            self.max_width,
            self.max_height,
            self.output_width,
            self.output_height,
        )
    }

    /// Intake budget for the session
    pub fn limits(&self) -> IntakeLimits {
        IntakeLimits {
            capacity: self.max_images,
            size_limit_bytes: self.size_limit_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.size_limit_bytes, 10 * 1024 * 1024);
        assert_eq!(config.crop_spec().aspect_ratio, 1.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = PipelineConfig::from_json(
            r#"{"max_width": 30, "max_height": 20, "max_images": 6, "scan_policy": "wraparound"}"#,
        )
        .unwrap();

        assert_eq!(config.max_images, 6);
        assert_eq!(config.crop_spec().aspect_ratio, 1.5);
        assert_eq!(config.scan_policy, ScanPolicy::Wraparound);
        assert_eq!(config.decode_policy, DecodePolicy::DropFailed);
        assert_eq!(config.output_width, 141);
    }

    #[test]
    fn test_json_round_trip() {
        let config = PipelineConfig {
            decode_policy: DecodePolicy::AbortBatch,
            ..PipelineConfig::default()
        };
        let restored = PipelineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let zero_height = PipelineConfig {
            max_height: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(zero_height.validate(), Err(ConfigError::Invalid(_))));

        let no_images = PipelineConfig {
            max_images: 0,
            ..PipelineConfig::default()
        };
        assert!(no_images.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"max_images": 9}"#).unwrap();

        let config = PipelineConfig::load(&path).unwrap();

        assert_eq!(config.max_images, 9);
        assert_eq!(config.limits().capacity, 9);
    }

    #[test]
    fn test_load_reports_parse_and_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();

        assert!(matches!(
            PipelineConfig::load(&bad),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            PipelineConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"output_width": 0}"#).unwrap();

        assert!(matches!(
            PipelineConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }
}
