// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remotes listing command

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::query::{open_session, SessionOptions};
use flatquery::output::print_json;
use flatquery::Installation;

/// Remote row for JSON output
#[derive(Debug, Serialize)]
struct RemoteResult {
    installation: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    status: &'static str,
    /// Installable (not yet installed) applications; absent unless loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<usize>,
    appstream_dir: String,
}

/// Run the remotes command
pub fn run(options: &SessionOptions, format: OutputFormat, compact: bool) -> Result<()> {
    let session = open_session(options);
    let mut results: Vec<RemoteResult> = Vec::new();

    for installation in &session.installations {
        let remotes = match installation.remotes() {
            Ok(remotes) => remotes,
            Err(err) => {
                // open_session already warned about this installation
                tracing::debug!(installation = installation.id(), error = %err, "no remotes listed");
                continue;
            }
        };
        for remote in remotes {
            let loaded_here = session.loaded_from.get(&remote.name).map(String::as_str)
                == Some(installation.id());
            let status = if remote.disabled {
                "disabled"
            } else if loaded_here {
                "loaded"
            } else if session.loaded_from.contains_key(&remote.name) {
                "shadowed"
            } else if session.failed.contains(&remote.name) {
                "failed"
            } else {
                "unavailable"
            };
            let records = if loaded_here {
                session.index.records(&remote.name).map(|records| records.len())
            } else {
                None
            };
            results.push(RemoteResult {
                installation: installation.id().to_string(),
                name: remote.name,
                title: remote.title,
                url: remote.url,
                status,
                records,
                appstream_dir: remote.appstream_dir.display().to_string(),
            });
        }
    }

    match format {
        OutputFormat::Json => print_json(&results, compact)?,
        OutputFormat::Text => {
            if results.is_empty() {
                println!("{} No remotes configured", "✗".red());
            }
            for result in &results {
                let status = match result.status {
                    "loaded" => format!(
                        "{} apps",
                        result.records.unwrap_or_default().to_string().cyan()
                    ),
                    other => other.yellow().to_string(),
                };
                println!(
                    "  {} {} [{}] {}",
                    result.name.green(),
                    result.title.as_deref().unwrap_or_default(),
                    result.installation.blue(),
                    status
                );
            }
        }
    }

    Ok(())
}
