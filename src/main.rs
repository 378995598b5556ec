//! flatquery - Search installable Flatpak applications
//!
//! Reads the AppStream catalogs Flatpak caches for each enabled remote and
//! searches them by keyword, leaving out applications already installed.

mod cli;
mod logging;
mod query;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, OutputFormat};
use flatquery::config::{Config, ConfigOutputFormat};
use query::SessionOptions;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let config = Config::load();
    let format = cli.format.unwrap_or(match config.output_format() {
        Some(ConfigOutputFormat::Json) => OutputFormat::Json,
        _ => OutputFormat::Text,
    });
    let options = SessionOptions::resolve(&cli, &config);

    match cli.command {
        Commands::Search {
            keyword,
            repo,
            limit,
            min_length,
        } => {
            let options = options.with_min_keyword_len(min_length);
            let limit = config.merge_max_results(limit);
            query::search::run(&options, &keyword, repo.as_deref(), limit, format, cli.compact)?;
        }
        Commands::Remotes => {
            query::remotes::run(&options, format, cli.compact)?;
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "flatquery", &mut std::io::stdout());
        }
    }

    Ok(())
}
