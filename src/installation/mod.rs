// SPDX-License-Identifier: MIT OR Apache-2.0

//! Installation environment: remotes and installed application refs

pub mod flatpak;

use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::errors::Result;

pub use flatpak::FlatpakInstallation;

/// A named package source and where its catalog metadata is cached locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub disabled: bool,
    pub appstream_dir: PathBuf,
}

impl Remote {
    pub fn new(name: impl Into<String>, appstream_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            title: None,
            url: None,
            disabled: false,
            appstream_dir: appstream_dir.into(),
        }
    }
}

/// Source of remotes and installed refs
pub trait Installation {
    /// Short label used in logs and output (e.g. `system`, `user`)
    fn id(&self) -> &str;

    /// Every configured remote, disabled ones included
    fn remotes(&self) -> Result<Vec<Remote>>;

    /// Installed application refs formatted as `app/<id>/<arch>/<branch>`
    fn installed_app_refs(&self) -> Result<Vec<String>>;
}

/// Snapshot of installed application refs, taken before any catalog is loaded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledSet {
    refs: HashSet<String>,
}

impl InstalledSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect installed refs across all given installations
    pub fn snapshot(installations: &[&dyn Installation]) -> Result<Self> {
        let mut set = Self::new();
        for installation in installations {
            set.extend_from(*installation)?;
        }
        Ok(set)
    }

    /// Merge in the refs of another installation
    pub fn extend_from(&mut self, installation: &dyn Installation) -> Result<()> {
        let refs = installation.installed_app_refs()?;
        tracing::debug!(
            installation = installation.id(),
            installed = refs.len(),
            "collected installed refs"
        );
        self.refs.extend(refs);
        Ok(())
    }

    pub fn contains(&self, bundle_ref: &str) -> bool {
        self.refs.contains(bundle_ref)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for InstalledSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            refs: iter.into_iter().map(Into::into).collect(),
        }
    }
}
