// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flatpak installation reader working directly on the on-disk layout
//!
//! ```text
//! <root>/repo/config                              remotes (key-file groups)
//! <root>/appstream/<remote>/<arch>/active/        cached catalog + icons
//! <root>/app/<id>/<arch>/<branch>/active          installed applications
//! ```

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::{CatalogError, Result};
use crate::installation::{Installation, Remote};

pub const SYSTEM_ROOT: &str = "/var/lib/flatpak";
const REPO_CONFIG_REL: &str = "repo/config";

#[derive(Debug, Clone)]
pub struct FlatpakInstallation {
    id: String,
    root: PathBuf,
    arch: String,
}

impl FlatpakInstallation {
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            id: root.display().to_string(),
            root,
            arch: default_arch().to_string(),
        }
    }

    pub fn system() -> Self {
        Self::at(SYSTEM_ROOT).with_id("system")
    }

    /// `$XDG_DATA_HOME/flatpak`, if a data directory can be determined
    pub fn user() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::at(dir.join("flatpak")).with_id("user"))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = arch.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub fn appstream_dir(&self, remote: &str) -> PathBuf {
        self.root
            .join("appstream")
            .join(remote)
            .join(&self.arch)
            .join("active")
    }
}

impl Installation for FlatpakInstallation {
    fn id(&self) -> &str {
        &self.id
    }

    fn remotes(&self) -> Result<Vec<Remote>> {
        let config_path = self.root.join(REPO_CONFIG_REL);
        let content = match std::fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %config_path.display(), "no repo config");
                return Ok(Vec::new());
            }
            Err(err) => return Err(CatalogError::io(config_path, err)),
        };

        let mut remotes: Vec<Remote> = parse_remote_groups(&content)
            .into_iter()
            .map(|group| {
                let mut remote = Remote::new(&group.name, self.appstream_dir(&group.name));
                remote.title = group.title;
                remote.url = group.url;
                remote.disabled = group.disabled;
                remote
            })
            .collect();
        remotes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(remotes)
    }

    fn installed_app_refs(&self) -> Result<Vec<String>> {
        let app_root = self.root.join("app");
        if !app_root.is_dir() {
            return Ok(Vec::new());
        }

        let mut refs = Vec::new();
        for entry in WalkDir::new(&app_root).min_depth(3).max_depth(3) {
            let entry = entry.map_err(|err| CatalogError::Installation {
                root: self.root.clone(),
                message: err.to_string(),
            })?;
            if !entry.file_type().is_dir() || !entry.path().join("active").exists() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&app_root) else {
                continue;
            };
            let parts: Vec<&str> = rel.iter().filter_map(|part| part.to_str()).collect();
            if let [id, arch, branch] = parts.as_slice() {
                refs.push(format!("app/{id}/{arch}/{branch}"));
            }
        }
        refs.sort();
        Ok(refs)
    }
}

/// Flatpak's name for the host architecture
pub fn default_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86" => "i386",
        other => other,
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct RemoteGroup {
    name: String,
    title: Option<String>,
    url: Option<String>,
    disabled: bool,
}

/// Extract `[remote "<name>"]` groups from an OSTree repo config.
fn parse_remote_groups(content: &str) -> Vec<RemoteGroup> {
    let mut groups: Vec<RemoteGroup> = Vec::new();
    let mut in_remote = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_remote = false;
            if let Some(name) = header
                .strip_prefix("remote \"")
                .and_then(|rest| rest.strip_suffix('"'))
            {
                if !name.is_empty() {
                    groups.push(RemoteGroup {
                        name: name.to_string(),
                        ..RemoteGroup::default()
                    });
                    in_remote = true;
                }
            }
            continue;
        }

        if !in_remote {
            continue;
        }
        let (Some((key, value)), Some(group)) = (line.split_once('='), groups.last_mut()) else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "url" => group.url = Some(value.to_string()),
            "xa.title" => group.title = Some(value.to_string()),
            "xa.disable" => group.disabled = matches!(value, "true" | "1"),
            _ => {}
        }
    }

    groups
}
