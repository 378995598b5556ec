// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword search command

use anyhow::Result;
use colored::Colorize;

use crate::cli::OutputFormat;
use crate::query::{open_session, SessionOptions};
use flatquery::catalog::appstream::UrlKind;
use flatquery::output::print_json;
use flatquery::SearchHit;

const SEPARATOR_WIDTH: usize = 50;

/// Run the search command
pub fn run(
    options: &SessionOptions,
    keyword: &str,
    repo: Option<&str>,
    limit: Option<usize>,
    format: OutputFormat,
    compact: bool,
) -> Result<()> {
    let session = open_session(options);
    tracing::debug!(keyword, repo, "search");

    let hits = session.index.search(keyword, repo)?;
    let shown = limit.map_or(hits.len(), |limit| limit.min(hits.len()));
    let hits = &hits[..shown];

    match format {
        OutputFormat::Json => print_json(hits, compact)?,
        OutputFormat::Text => {
            if hits.is_empty() {
                println!(
                    "{} No applications found matching: {}",
                    "✗".red(),
                    keyword.yellow()
                );
                let min = session.index.min_keyword_len();
                if keyword.chars().count() < min {
                    println!("  Keywords must be at least {min} characters long.");
                }
            } else {
                for hit in hits {
                    print_hit(hit);
                }
                println!(
                    "{} Found {} applications",
                    "✓".green(),
                    hits.len().to_string().cyan()
                );
            }
        }
    }

    Ok(())
}

fn print_hit(hit: &SearchHit<'_>) {
    let record = hit.record;
    let field = |label: &str, value: &str| println!("{} {}", format!("{label}:").blue(), value);

    println!("{} {}", "Name:".blue(), record.name().green().bold());
    field("ID", record.id());
    field("Summary", record.summary());
    field("Description", record.description());
    field("Version", record.version().unwrap_or("None"));
    field("Icon URL", record.icon_remote_url());
    field(
        "Icon PATH 128x128",
        &record.icon_cache_path_128().display().to_string(),
    );
    field(
        "Icon PATH 64x64",
        &record.icon_cache_path_64().display().to_string(),
    );
    field("Icon FILE", record.icon_cached_filename());
    field("Developer", record.developer());
    field("Categories", &record.categories().join(", "));
    for kind in UrlKind::ALL {
        let label = match kind {
            UrlKind::Donation => "Donation URL",
            UrlKind::Homepage => "Homepage URL",
            UrlKind::Bugtracker => "Bug Tracker URL",
        };
        field(label, record.url(kind));
    }
    field("Bundle ID", record.bundle_id());
    println!("{} {}", "Match Type:".blue(), hit.match_kind.to_string().yellow());
    field("Repo", record.repo_name());
    println!("{}", "-".repeat(SEPARATOR_WIDTH));
}
