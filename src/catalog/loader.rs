// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-remote catalog loading with installed-application exclusion

use std::path::PathBuf;

use crate::cancel::CancelToken;
use crate::catalog::appstream::{CatalogReader, ComponentKind};
use crate::catalog::record::CatalogRecord;
use crate::errors::Result;
use crate::installation::{InstalledSet, Remote};

pub const CATALOG_FILE_NAME: &str = "appstream.xml.gz";
pub const FLATPAK_BUNDLE_KIND: &str = "flatpak";

/// Builds the record list for one remote. The installed snapshot must be
/// complete before the first load.
pub struct CatalogLoader<'a> {
    installed: &'a InstalledSet,
    cancel: Option<&'a CancelToken>,
}

impl<'a> CatalogLoader<'a> {
    pub fn new(installed: &'a InstalledSet) -> Self {
        Self {
            installed,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: &'a CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn catalog_path(remote: &Remote) -> PathBuf {
        remote.appstream_dir.join(CATALOG_FILE_NAME)
    }

    /// Load desktop applications from the remote's cached catalog.
    ///
    /// A missing catalog yields an empty list. Components already installed
    /// are skipped, as are desktop components lacking an id or flatpak bundle.
    pub fn load(&self, remote: &Remote) -> Result<Vec<CatalogRecord>> {
        let path = Self::catalog_path(remote);
        if !path.is_file() {
            tracing::debug!(repo = %remote.name, path = %path.display(), "AppStream file not found");
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut excluded = 0usize;
        let mut malformed = 0usize;

        for component in CatalogReader::open(&path)? {
            CancelToken::check(self.cancel)?;
            let component = component?;
            if component.kind != ComponentKind::DesktopApp {
                continue;
            }

            let Some(id) = component.id.as_deref().filter(|id| !id.is_empty()) else {
                tracing::warn!(repo = %remote.name, name = %component.name, "skipping component without id");
                malformed += 1;
                continue;
            };
            let Some(bundle_id) = component.bundle_id(FLATPAK_BUNDLE_KIND) else {
                tracing::warn!(repo = %remote.name, id, "skipping component without flatpak bundle");
                malformed += 1;
                continue;
            };
            if self.installed.contains(bundle_id) {
                excluded += 1;
                continue;
            }

            records.push(CatalogRecord::from_component(
                &component, id, bundle_id, remote,
            ));
        }

        tracing::info!(
            repo = %remote.name,
            records = records.len(),
            excluded,
            malformed,
            "loaded catalog"
        );
        Ok(records)
    }
}
