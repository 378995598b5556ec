// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file support for flatquery
//!
//! Loads configuration from .flatqueryrc.toml in current directory or ~/.config/flatquery/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::index::DEFAULT_MIN_KEYWORD_LEN;

/// Output format for results (mirrored from cli for library use)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigOutputFormat {
    #[default]
    Text,
    Json,
}

/// Configuration loaded from .flatqueryrc.toml or ~/.config/flatquery/config.toml
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Installation roots to search instead of the system/user defaults
    pub installations: Vec<PathBuf>,
    /// Include the system installation (default: true)
    pub system: Option<bool>,
    /// Include the per-user installation (default: true)
    pub user: Option<bool>,
    /// Architecture whose appstream data is read
    pub arch: Option<String>,
    /// Minimum keyword length; shorter keywords return nothing
    pub min_keyword_len: Option<usize>,
    /// Maximum number of results to print
    pub max_results: Option<usize>,
    /// Default output format (text or json)
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from files
    ///
    /// Precedence (highest to lowest):
    /// 1. .flatqueryrc.toml in current directory
    /// 2. ~/.config/flatquery/config.toml
    pub fn load() -> Self {
        if let Some(config) = Self::load_from_path(Path::new(".flatqueryrc.toml")) {
            return config;
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("flatquery").join("config.toml");
            if let Some(config) = Self::load_from_path(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    pub fn load_from_path(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to parse config");
                None
            }
        }
    }

    /// Get output format from config, parsing the string to ConfigOutputFormat
    pub fn output_format(&self) -> Option<ConfigOutputFormat> {
        self.default_format
            .as_ref()
            .and_then(|s| match s.to_lowercase().as_str() {
                "json" => Some(ConfigOutputFormat::Json),
                "text" => Some(ConfigOutputFormat::Text),
                _ => None,
            })
    }

    pub fn min_keyword_len(&self) -> usize {
        self.min_keyword_len.unwrap_or(DEFAULT_MIN_KEYWORD_LEN)
    }

    /// Merge CLI options with config (CLI wins); `None` means unlimited
    pub fn merge_max_results(&self, cli_value: Option<usize>) -> Option<usize> {
        cli_value.or(self.max_results)
    }
}
