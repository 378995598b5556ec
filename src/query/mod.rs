// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query module - session setup plus the search and remotes commands

pub mod remotes;
pub mod search;

use colored::Colorize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::cli::Cli;
use flatquery::config::Config;
use flatquery::{FlatpakInstallation, Installation, InstalledSet, SearchIndex};

/// Which installations to read and how to search them, after merging CLI and config
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub installations: Vec<PathBuf>,
    pub system: bool,
    pub user: bool,
    pub arch: Option<String>,
    pub min_keyword_len: usize,
}

impl SessionOptions {
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        let installations = if cli.installations.is_empty() {
            config.installations.clone()
        } else {
            cli.installations.clone()
        };
        Self {
            installations,
            system: !cli.no_system && config.system.unwrap_or(true),
            user: !cli.no_user && config.user.unwrap_or(true),
            arch: cli.arch.clone().or_else(|| config.arch.clone()),
            min_keyword_len: config.min_keyword_len(),
        }
    }

    pub fn with_min_keyword_len(mut self, min_keyword_len: Option<usize>) -> Self {
        if let Some(min_keyword_len) = min_keyword_len {
            self.min_keyword_len = min_keyword_len;
        }
        self
    }

    /// Explicit roots replace the system/user defaults
    pub fn installations(&self) -> Vec<FlatpakInstallation> {
        let mut installations: Vec<FlatpakInstallation> = if self.installations.is_empty() {
            let mut defaults = Vec::new();
            if self.system {
                defaults.push(FlatpakInstallation::system());
            }
            if self.user {
                defaults.extend(FlatpakInstallation::user());
            }
            defaults
        } else {
            self.installations
                .iter()
                .map(FlatpakInstallation::at)
                .collect()
        };

        if let Some(arch) = &self.arch {
            installations = installations
                .into_iter()
                .map(|installation| installation.with_arch(arch.as_str()))
                .collect();
        }
        installations
    }
}

/// A loaded search session and what went wrong while loading it
pub struct Session {
    pub index: SearchIndex,
    pub installations: Vec<FlatpakInstallation>,
    /// Remote name to the id of the installation it was loaded from
    pub loaded_from: HashMap<String, String>,
    /// Remote names whose catalog failed to load
    pub failed: Vec<String>,
}

/// Snapshot installed refs from every installation, then load their remotes.
/// Unreadable installations and remotes are reported on stderr and skipped.
pub fn open_session(options: &SessionOptions) -> Session {
    let installations = options.installations();

    let mut installed = InstalledSet::new();
    for installation in &installations {
        if let Err(err) = installed.extend_from(installation) {
            warn(&format!("skipping installed refs of '{}': {err}", installation.id()));
        }
    }

    let mut index = SearchIndex::new(installed).with_min_keyword_len(options.min_keyword_len);
    let mut loaded_from = HashMap::new();
    let mut failed = Vec::new();
    for installation in &installations {
        match index.add_installation(installation) {
            Ok(report) => {
                for (name, _) in report.loaded {
                    loaded_from.insert(name, installation.id().to_string());
                }
                for (name, err) in report.failed {
                    warn(&format!("skipping remote '{name}': {err}"));
                    failed.push(name);
                }
            }
            Err(err) => warn(&format!(
                "skipping installation '{}': {err}",
                installation.id()
            )),
        }
    }

    Session {
        index,
        installations,
        loaded_from,
        failed,
    }
}

fn warn(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}
