//! `.formscan.toml` configuration
//!
//! Configuration files can be placed in:
//! - User home directory: ~/.formscan.toml (user defaults)
//! - Project directory: ./.formscan.toml (project defaults)
//! - Custom location via --config flag (replaces both)
//!
//! Precedence order (highest to lowest):
//! 1. Command-line arguments (--format, --y-tolerance, etc.)
//! 2. Project config (./.formscan.toml)
//! 3. User config (~/.formscan.toml)
//! 4. Built-in defaults

use anyhow::{Context, Result};
use clap::ValueEnum;
use formscan_core::LineTerminator;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".formscan.toml";

/// Output format for the convert command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Two-column label,value CSV
    #[default]
    Csv,
    /// JSON array of {label, value} objects
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Default settings for convert command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convert: Option<ConvertConfig>,

    /// CSV output settings, shared by convert and merge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv: Option<CsvConfig>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Default output format (csv or json)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,

    /// Row grouping tolerance in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_tolerance: Option<f64>,

    /// Sort rows top to bottom after grouping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_rows: Option<bool>,

    /// Process pages in parallel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,

    /// Drop malformed fragments instead of failing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_invalid: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Row terminator (crlf or lf)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_terminator: Option<LineTerminator>,

    /// Write a Label,Value header row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_row: Option<bool>,
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load `--config PATH` if given, otherwise discover and merge user and project files
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            log::debug!("Using config file {}", path.display());
            return Self::load_from_file(path);
        }
        let user_config = dirs::home_dir().and_then(|home| Self::load_optional(&home.join(CONFIG_FILE_NAME)));
        let project_config = Self::load_optional(&PathBuf::from(CONFIG_FILE_NAME));
        Ok(Self::merge(user_config, project_config))
    }

    /// Load a discovered config file; a broken file is reported and ignored
    fn load_optional(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => {
                log::debug!("Loaded config from {}", path.display());
                Some(config)
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {e:#}", path.display());
                None
            }
        }
    }

    /// Merge configs field by field: project overrides user
    pub fn merge(user_config: Option<Self>, project_config: Option<Self>) -> Self {
        let mut merged = user_config.unwrap_or_default();

        if let Some(project) = project_config {
            if let Some(convert) = project.convert {
                let mut merged_convert = merged.convert.unwrap_or_default();
                if let Some(format) = convert.format {
                    merged_convert.format = Some(format);
                }
                if let Some(y_tolerance) = convert.y_tolerance {
                    merged_convert.y_tolerance = Some(y_tolerance);
                }
                if let Some(sort_rows) = convert.sort_rows {
                    merged_convert.sort_rows = Some(sort_rows);
                }
                if let Some(parallel) = convert.parallel {
                    merged_convert.parallel = Some(parallel);
                }
                if let Some(skip_invalid) = convert.skip_invalid {
                    merged_convert.skip_invalid = Some(skip_invalid);
                }
                merged.convert = Some(merged_convert);
            }

            if let Some(csv) = project.csv {
                let mut merged_csv = merged.csv.unwrap_or_default();
                if let Some(line_terminator) = csv.line_terminator {
                    merged_csv.line_terminator = Some(line_terminator);
                }
                if let Some(header_row) = csv.header_row {
                    merged_csv.header_row = Some(header_row);
                }
                merged.csv = Some(merged_csv);
            }
        }

        merged
    }

    #[inline]
    pub fn convert(&self) -> ConvertConfig {
        self.convert.clone().unwrap_or_default()
    }

    #[inline]
    pub fn csv(&self) -> CsvConfig {
        self.csv.clone().unwrap_or_default()
    }
}
