//! Export configuration.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::DEFAULT_FILE_PREFIX;
use crate::error::ConfigError;

/// Controls where and how the end-game artifacts are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    #[serde(default = "ExportConfig::default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "ExportConfig::default_file_prefix")]
    pub file_prefix: String,
    #[serde(default = "ExportConfig::default_pretty")]
    pub pretty: bool,
    #[serde(default)]
    pub dump_tech_database: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: Self::default_output_dir(),
            file_prefix: Self::default_file_prefix(),
            pretty: Self::default_pretty(),
            dump_tech_database: false,
        }
    }
}

impl ExportConfig {
    fn default_output_dir() -> PathBuf {
        PathBuf::from(".")
    }

    fn default_file_prefix() -> String {
        DEFAULT_FILE_PREFIX.to_string()
    }

    const fn default_pretty() -> bool {
        true
    }

    /// Parse a configuration from JSON, filling omitted fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the file prefix is empty.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde defaults cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error if the file prefix is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_prefix.trim().is_empty() {
            return Err(ConfigError::EmptyFilePrefix);
        }
        Ok(())
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}
