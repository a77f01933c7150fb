//! Configuration handling for consensus-check

use crate::extractor::ExtractionMode;
use crate::loader::SHARED_TYPES_PATH;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Names searched in each directory, most specific first
pub const CONFIG_NAMES: &[&str] = &[
    ".consensus-check.json",
    ".consensus-check.yaml",
    ".consensus-check.yml",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[from] std::io::Error),
    #[error("Failed to parse JSON config: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("Failed to parse YAML config: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
    #[error("Invalid extraction mode: {0}")]
    InvalidMode(String),
}

/// Runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mode: ExtractionMode,
    /// Only run these rules (empty means all)
    pub select: Vec<String>,
    pub skip: Vec<String>,
    /// Checked source, relative to the root
    pub source_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::default(),
            select: Vec::new(),
            skip: Vec::new(),
            source_path: SHARED_TYPES_PATH.to_string(),
        }
    }
}

/// CLI options to merge into config
#[derive(Debug, Default)]
pub struct CliOptions {
    pub mode: Option<ExtractionMode>,
    /// Replaces the configured selection when non-empty
    pub select: Vec<String>,
    /// Added to the configured skips
    pub skip: Vec<String>,
}

/// Configuration file format (.consensus-check.json or .consensus-check.yaml)
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    /// "balanced" or "single-level"
    #[serde(default)]
    pub mode: Option<String>,

    #[serde(default)]
    pub select: Vec<String>,

    #[serde(default)]
    pub skip: Vec<String>,

    #[serde(default)]
    pub source_path: Option<String>,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config_file: ConfigFile = if path.extension().is_some_and(|e| e == "yaml" || e == "yml")
        {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        Self::from_config_file(config_file)
    }

    /// Walk up from `start_dir` looking for a config file
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        let mut current = start_dir.to_path_buf();
        loop {
            for name in CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.is_file() {
                    let config = Self::from_file(&config_path)?;
                    return Ok(Some((config_path, config)));
                }
            }

            if !current.pop() {
                break;
            }
        }

        Ok(None)
    }

    fn from_config_file(file: ConfigFile) -> Result<Self, ConfigError> {
        let mode = match file.mode {
            Some(m) => m.parse().map_err(ConfigError::InvalidMode)?,
            None => ExtractionMode::default(),
        };

        Ok(Self {
            mode,
            select: file.select,
            skip: file.skip,
            source_path: file
                .source_path
                .unwrap_or_else(|| SHARED_TYPES_PATH.to_string()),
        })
    }

    /// Merge CLI options into this config (CLI takes precedence)
    pub fn merge_cli(&mut self, opts: CliOptions) {
        if let Some(mode) = opts.mode {
            self.mode = mode;
        }

        if !opts.select.is_empty() {
            self.select = opts.select;
        }

        self.skip.extend(opts.skip);
    }
}
