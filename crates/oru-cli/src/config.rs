//! Processor settings.
//!
//! Values come from, in order of precedence: command-line flags (and their
//! environment variables), an optional TOML settings file, then defaults.
//!
//! ```toml
//! table = "LabResults"
//! source_root = "/srv/objects"
//! output_dir = "/srv/store"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default table name when none is configured.
pub const DEFAULT_TABLE: &str = "LabResults";

/// Environment variable naming the results table.
pub const TABLE_ENV: &str = "LAB_RESULTS_TABLE";

const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings file contents. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub table: Option<String>,
    pub source_root: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    pub table: String,
    pub source_root: PathBuf,
    pub output_dir: PathBuf,
}

/// Command-line overrides; `None` defers to the settings file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub table: Option<String>,
    pub source_root: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Loads a settings file.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

impl Settings {
    /// Applies overrides and defaults.
    pub fn resolve(self, overrides: Overrides) -> ProcessorConfig {
        ProcessorConfig {
            table: overrides
                .table
                .filter(|table| !table.trim().is_empty())
                .or(self.table)
                .unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            source_root: overrides
                .source_root
                .or(self.source_root)
                .unwrap_or_else(|| PathBuf::from(".")),
            output_dir: overrides
                .output_dir
                .or(self.output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        }
    }
}
