//! Configuration parsing and management.

use crate::dates::DateFormat;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// How a document qualifies as "marked".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkedDetection {
    /// The document name carries the marker.
    #[default]
    Name,
    /// The document name or its content carries the marker.
    Content,
}

/// Main configuration struct matching the vaultnews.yml schema.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Vault directory holding the markdown documents
    #[serde(default = "default_vault")]
    pub vault: PathBuf,

    /// Glyph marking a document or a link as news
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Documents modified within this many days are detected as news
    #[serde(default = "default_detect_days")]
    pub detect_days: u32,

    /// Markers older than this many days are retired by cleanup
    #[serde(default = "default_retire_days")]
    pub retire_days: u32,

    /// Name of the digest document, written at the vault root
    #[serde(default = "default_digest_file")]
    pub digest_file: String,

    #[serde(default)]
    pub date_format: DateFormat,

    /// Path substrings excluded from scanning
    #[serde(default = "default_special_paths")]
    pub special_paths: Vec<String>,

    /// Template file (None means use the built-in template)
    #[serde(default)]
    pub template: Option<PathBuf>,

    /// Prefix pointed-section lines with the target's date
    #[serde(default = "default_true")]
    pub pointed_dates: bool,

    #[serde(default)]
    pub marked_detection: MarkedDetection,

    /// Tag characters the template must contain for a digest to be written
    #[serde(default)]
    pub required_sections: Vec<char>,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_vault() -> PathBuf {
    PathBuf::from("vault")
}

fn default_marker() -> String {
    String::from("🆕")
}

fn default_detect_days() -> u32 {
    15
}

fn default_retire_days() -> u32 {
    30
}

fn default_digest_file() -> String {
    String::from("News.md")
}

fn default_special_paths() -> Vec<String> {
    vec![default_digest_file()]
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault: default_vault(),
            marker: default_marker(),
            detect_days: default_detect_days(),
            retire_days: default_retire_days(),
            digest_file: default_digest_file(),
            date_format: DateFormat::default(),
            special_paths: default_special_paths(),
            template: None,
            pointed_dates: true,
            marked_detection: MarkedDetection::default(),
            required_sections: Vec::new(),
            config_path: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Parse configuration from YAML text. Empty input yields the defaults.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = if contents.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(contents)?
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.marker.is_empty() {
            return Err(ConfigError::Invalid {
                field: "marker".into(),
                message: "the news marker cannot be empty".into(),
            });
        }
        if self.digest_file.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "digest_file".into(),
                message: "the digest file name cannot be empty".into(),
            });
        }
        Ok(())
    }

    /// Get the vault directory, resolved relative to config file
    pub fn vault_dir(&self) -> PathBuf {
        self.resolve_path(&self.vault)
    }

    /// Get the template file, resolved relative to config file
    pub fn template_path(&self) -> Option<PathBuf> {
        self.template.as_ref().map(|p| self.resolve_path(p))
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(config_path) = &self.config_path {
            if let Some(parent) = config_path.parent() {
                parent.join(path)
            } else {
                path.to_path_buf()
            }
        } else {
            path.to_path_buf()
        }
    }

    /// Digest file name, always ending in `.md`
    pub fn digest_file_name(&self) -> String {
        normalize_digest_name(&self.digest_file)
    }

    /// True when `path` is the digest itself or contains a non-empty special path
    pub fn is_special_path(&self, path: &str) -> bool {
        if path == self.digest_file_name() {
            return true;
        }
        self.special_paths
            .iter()
            .filter(|special| !special.is_empty())
            .any(|special| path.contains(special.as_str()))
    }

    pub fn detection_window(&self) -> Duration {
        Duration::days(i64::from(self.detect_days))
    }

    pub fn retirement_window(&self) -> Duration {
        Duration::days(i64::from(self.retire_days))
    }
}

/// Force a `.md` extension: text before the first dot, or the whole name.
pub fn normalize_digest_name(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.split_once('.') {
        Some((stem, _)) => format!("{stem}.md"),
        None => format!("{trimmed}.md"),
    }
}
