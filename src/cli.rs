// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// flatquery - Search installable Flatpak applications
///
/// Searches the AppStream catalogs cached by Flatpak for every enabled remote,
/// leaving out applications that are already installed.
#[derive(Parser, Debug)]
#[command(name = "flatquery")]
#[command(
    author,
    version,
    about,
    long_about = None,
    after_help = "Examples:\n  flatquery search lutris\n  flatquery s \"photo editor\" --repo flathub\n  flatquery --format json search net.lutris"
)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Compact JSON output (no pretty formatting)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Flatpak installation root to read (repeatable; replaces system/user defaults)
    #[arg(long = "installation", global = true, value_name = "PATH")]
    pub installations: Vec<PathBuf>,

    /// Skip the system installation
    #[arg(long, global = true)]
    pub no_system: bool,

    /// Skip the per-user installation
    #[arg(long, global = true)]
    pub no_user: bool,

    /// Architecture whose appstream data is read (defaults to the host)
    #[arg(long, global = true)]
    pub arch: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search installable applications by name, id or summary
    #[command(visible_aliases = ["s", "find"])]
    Search {
        /// Keyword to look for (case-insensitive substring)
        keyword: String,

        /// Only search this remote
        #[arg(short = 'r', long)]
        repo: Option<String>,

        /// Maximum number of results
        #[arg(short = 'm', long = "limit", visible_alias = "max-results")]
        limit: Option<usize>,

        /// Minimum keyword length (0 disables the check)
        #[arg(long)]
        min_length: Option<usize>,
    },

    /// List configured remotes and how many installable applications each offers
    #[command(visible_aliases = ["r", "repos"])]
    Remotes,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
