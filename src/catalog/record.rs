// SPDX-License-Identifier: MIT OR Apache-2.0

//! Searchable application records resolved from catalog components

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::catalog::appstream::{Component, IconKind, UrlKind};
use crate::installation::Remote;

/// Icon cache size buckets, relative to `<appstream dir>/icons/flatpak/`
pub const ICON_SIZE_128: &str = "128x128";
pub const ICON_SIZE_64: &str = "64x64";

/// Which field a keyword matched on. Variants are ordered by priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchKind {
    Name,
    Id,
    Summary,
    None,
}

impl MatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "NAME",
            Self::Id => "ID",
            Self::Summary => "SUMMARY",
            Self::None => "NONE",
        }
    }

    pub fn is_match(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Urls {
    pub donation: String,
    pub homepage: String,
    pub bugtracker: String,
}

impl Urls {
    fn from_component(component: &Component) -> Self {
        let lookup = |kind| component.url(kind).unwrap_or_default().to_string();
        Self {
            donation: lookup(UrlKind::Donation),
            homepage: lookup(UrlKind::Homepage),
            bugtracker: lookup(UrlKind::Bugtracker),
        }
    }

    /// "" when the catalog had no URL of this kind
    pub fn get(&self, kind: UrlKind) -> &str {
        match kind {
            UrlKind::Donation => &self.donation,
            UrlKind::Homepage => &self.homepage,
            UrlKind::Bugtracker => &self.bugtracker,
        }
    }
}

/// Immutable view of one installable desktop application from a remote's catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogRecord {
    name: String,
    id: String,
    summary: String,
    description: String,
    version: Option<String>,
    #[serde(rename = "icon_url")]
    icon_remote_url: String,
    #[serde(rename = "icon_path_128")]
    icon_cache_path_128: PathBuf,
    #[serde(rename = "icon_path_64")]
    icon_cache_path_64: PathBuf,
    #[serde(rename = "icon_filename")]
    icon_cached_filename: String,
    urls: Urls,
    developer: String,
    categories: Vec<String>,
    bundle_id: String,
    #[serde(rename = "repo")]
    repo_name: String,
}

impl CatalogRecord {
    /// Resolve a record from a catalog component. Icon cache paths are
    /// composed only; nothing on disk is checked.
    pub fn from_component(
        component: &Component,
        id: impl Into<String>,
        bundle_id: impl Into<String>,
        remote: &Remote,
    ) -> Self {
        Self {
            name: component.name.clone(),
            id: id.into(),
            summary: component.summary.clone(),
            description: component.description.clone(),
            version: component
                .releases
                .first()
                .and_then(|release| release.version.clone()),
            icon_remote_url: component
                .first_icon(IconKind::Remote)
                .unwrap_or_default()
                .to_string(),
            icon_cache_path_128: icon_cache_dir(&remote.appstream_dir, ICON_SIZE_128),
            icon_cache_path_64: icon_cache_dir(&remote.appstream_dir, ICON_SIZE_64),
            icon_cached_filename: component
                .first_icon(IconKind::Cached)
                .unwrap_or_default()
                .to_string(),
            urls: Urls::from_component(component),
            developer: component.developer.clone(),
            categories: component
                .categories
                .iter()
                .map(|category| category.to_lowercase())
                .collect(),
            bundle_id: bundle_id.into(),
            repo_name: remote.name.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Version of the first listed release; `None` without release metadata
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn bundle_id(&self) -> &str {
        &self.bundle_id
    }

    pub fn icon_remote_url(&self) -> &str {
        &self.icon_remote_url
    }

    pub fn icon_cached_filename(&self) -> &str {
        &self.icon_cached_filename
    }

    pub fn icon_cache_path_128(&self) -> &Path {
        &self.icon_cache_path_128
    }

    pub fn icon_cache_path_64(&self) -> &Path {
        &self.icon_cache_path_64
    }

    pub fn urls(&self) -> &Urls {
        &self.urls
    }

    pub fn url(&self, kind: UrlKind) -> &str {
        self.urls.get(kind)
    }

    pub fn developer(&self) -> &str {
        &self.developer
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    /// Cached icon file for a size bucket, if it exists on disk
    pub fn cached_icon_file(&self, size: &str) -> Option<PathBuf> {
        if self.icon_cached_filename.is_empty() {
            return None;
        }
        let dir = match size {
            ICON_SIZE_128 => &self.icon_cache_path_128,
            ICON_SIZE_64 => &self.icon_cache_path_64,
            _ => return None,
        };
        let file = dir.join(&self.icon_cached_filename);
        file.is_file().then_some(file)
    }

    /// Classify a keyword match. `keyword` must already be lower-case.
    /// Name wins over id, id over summary.
    pub fn search(&self, keyword: &str) -> MatchKind {
        if self.name.to_lowercase().contains(keyword) {
            MatchKind::Name
        } else if self.id.to_lowercase().contains(keyword) {
            MatchKind::Id
        } else if self.summary.to_lowercase().contains(keyword) {
            MatchKind::Summary
        } else {
            MatchKind::None
        }
    }
}

impl fmt::Display for CatalogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({})", self.name, self.summary, self.bundle_id)
    }
}

fn icon_cache_dir(appstream_dir: &Path, size: &str) -> PathBuf {
    appstream_dir.join("icons").join("flatpak").join(size)
}
