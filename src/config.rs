use crate::defaults;
use crate::error::{GestoError, Result};
use crate::stabilizer::StabilizerConfig;
use crate::templates::Language;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub stabilizer: StabilizerConfig,
    pub classifier: ClassifierConfig,
    pub daemon: DaemonConfig,
}

/// Frame classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    pub kind: ClassifierKind,
    pub loop_threshold: f32,
    pub if_threshold: f32,
    pub function_threshold: f32,
}

/// Daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DaemonConfig {
    pub default_language: String,
    pub socket: Option<PathBuf>,
}

/// Classifier selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    Brightness,
    Landmark,
    Passthrough,
}

impl FromStr for ClassifierKind {
    type Err = GestoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "brightness" => Ok(Self::Brightness),
            "landmark" => Ok(Self::Landmark),
            "passthrough" => Ok(Self::Passthrough),
            other => Err(GestoError::ConfigInvalidValue {
                key: "classifier.kind".to_string(),
                message: format!("unknown classifier '{}'", other),
            }),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::Brightness,
            loop_threshold: defaults::LOOP_LUMA_THRESHOLD,
            if_threshold: defaults::IF_LUMA_THRESHOLD,
            function_threshold: defaults::FUNCTION_LUMA_THRESHOLD,
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            default_language: defaults::DEFAULT_LANGUAGE.to_string(),
            socket: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GestoError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                GestoError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Panics on invalid TOML so a broken file is never silently ignored.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(GestoError::ConfigFileNotFound { .. }) => Self::default(),
            Err(e) => {
                panic!("Failed to load config from {}: {}", path.display(), e);
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - GESTO_CLASSIFIER → classifier.kind
    /// - GESTO_LANGUAGE → daemon.default_language
    /// - GESTO_SOCKET → daemon.socket
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(kind) = std::env::var("GESTO_CLASSIFIER")
            && let Ok(kind) = kind.parse::<ClassifierKind>()
        {
            self.classifier.kind = kind;
        }

        if let Ok(language) = std::env::var("GESTO_LANGUAGE")
            && !language.is_empty()
        {
            self.daemon.default_language = language;
        }

        if let Ok(socket) = std::env::var("GESTO_SOCKET")
            && !socket.is_empty()
        {
            self.daemon.socket = Some(PathBuf::from(socket));
        }

        self
    }

    /// Check value ranges that serde cannot express.
    ///
    /// Called once at daemon startup so a bad file fails loudly instead of
    /// misbehaving frame by frame.
    pub fn validate(&self) -> Result<()> {
        if self.stabilizer.history_window == 0 {
            return Err(GestoError::ConfigInvalidValue {
                key: "stabilizer.history_window".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.stabilizer.sequence_capacity == 0 {
            return Err(GestoError::ConfigInvalidValue {
                key: "stabilizer.sequence_capacity".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.stabilizer.min_confidence) {
            return Err(GestoError::ConfigInvalidValue {
                key: "stabilizer.min_confidence".to_string(),
                message: "must be between 0.0 and 1.0".to_string(),
            });
        }

        let c = &self.classifier;
        if !(c.loop_threshold > c.if_threshold && c.if_threshold > c.function_threshold) {
            return Err(GestoError::ConfigInvalidValue {
                key: "classifier.loop_threshold".to_string(),
                message: "brightness thresholds must be strictly descending".to_string(),
            });
        }

        Language::from_str(&self.daemon.default_language)?;

        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/gesto/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("gesto")
            .join("config.toml")
    }
}
