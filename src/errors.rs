// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types with helpful suggestions
//!
//! Load-time errors are scoped to a single repository; query-time errors are
//! reported straight back to the caller.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// A catalog or installation file exists but could not be read
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Corrupt archive or malformed catalog document
    #[error(
        "Malformed catalog '{}': {message}\n\n\
         Suggestion: refresh the remote metadata and retry.\n\
         Example: flatpak update --appstream",
        .path.display()
    )]
    Parse { path: PathBuf, message: String },

    /// Search scoped to a repository that was never loaded
    #[error(
        "Unknown repository: '{name}'\n\n\
         Loaded repositories: {}\n\n\
         Example: flatquery remotes",
        .known.join(", ")
    )]
    UnknownRepository { name: String, known: Vec<String> },

    /// The installation layout could not be enumerated
    #[error("Cannot read installation at '{}': {message}", .root.display())]
    Installation { root: PathBuf, message: String },

    #[error("Operation cancelled")]
    Cancelled,
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_repository_lists_loaded_names() {
        let err = CatalogError::UnknownRepository {
            name: "fedora".to_string(),
            known: vec!["flathub".to_string(), "gnome-nightly".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("'fedora'"));
        assert!(message.contains("flathub, gnome-nightly"));
    }
}
