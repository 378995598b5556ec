// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search session: per-remote record lists and keyword search over them

use rayon::prelude::*;
use serde::Serialize;

use crate::cancel::CancelToken;
use crate::catalog::loader::CatalogLoader;
use crate::catalog::record::{CatalogRecord, MatchKind};
use crate::errors::{CatalogError, Result};
use crate::installation::{Installation, InstalledSet, Remote};

/// Keywords shorter than this (in chars) return no results
pub const DEFAULT_MIN_KEYWORD_LEN: usize = 3;

/// One search match; classification belongs to the query, not the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchHit<'a> {
    #[serde(flatten)]
    pub record: &'a CatalogRecord,
    #[serde(rename = "match_type")]
    pub match_kind: MatchKind,
}

/// Outcome of loading every enabled remote of one installation
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Newly loaded remotes with their record counts, in remote order
    pub loaded: Vec<(String, usize)>,
    /// Remotes whose catalog could not be parsed
    pub failed: Vec<(String, CatalogError)>,
}

#[derive(Debug)]
struct Repository {
    name: String,
    records: Vec<CatalogRecord>,
}

/// Records for every loaded remote, kept in insertion order
#[derive(Debug)]
pub struct SearchIndex {
    installed: InstalledSet,
    repositories: Vec<Repository>,
    min_keyword_len: usize,
}

impl SearchIndex {
    /// Start a session from a completed installed-refs snapshot
    pub fn new(installed: InstalledSet) -> Self {
        Self {
            installed,
            repositories: Vec::new(),
            min_keyword_len: DEFAULT_MIN_KEYWORD_LEN,
        }
    }

    /// `0` disables the minimum keyword length
    pub fn with_min_keyword_len(mut self, min_keyword_len: usize) -> Self {
        self.min_keyword_len = min_keyword_len;
        self
    }

    pub fn installed(&self) -> &InstalledSet {
        &self.installed
    }

    pub fn min_keyword_len(&self) -> usize {
        self.min_keyword_len
    }

    pub fn contains_repository(&self, name: &str) -> bool {
        self.repository(name).is_some()
    }

    /// Loaded repository names with record counts, in insertion order
    pub fn repositories(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.repositories
            .iter()
            .map(|repo| (repo.name.as_str(), repo.records.len()))
    }

    pub fn records(&self, name: &str) -> Option<&[CatalogRecord]> {
        self.repository(name).map(|repo| repo.records.as_slice())
    }

    fn repository(&self, name: &str) -> Option<&Repository> {
        self.repositories.iter().find(|repo| repo.name == name)
    }

    /// Load a remote unless one with the same name is already loaded.
    /// Returns the number of records held for that name.
    pub fn add_repository(&mut self, remote: &Remote) -> Result<usize> {
        self.add_repository_inner(remote, None)
    }

    pub fn add_repository_with_cancel(
        &mut self,
        remote: &Remote,
        cancel: &CancelToken,
    ) -> Result<usize> {
        self.add_repository_inner(remote, Some(cancel))
    }

    fn add_repository_inner(
        &mut self,
        remote: &Remote,
        cancel: Option<&CancelToken>,
    ) -> Result<usize> {
        if let Some(existing) = self.repository(&remote.name) {
            return Ok(existing.records.len());
        }

        let mut loader = CatalogLoader::new(&self.installed);
        if let Some(cancel) = cancel {
            loader = loader.with_cancel(cancel);
        }
        let records = loader.load(remote)?;
        let count = records.len();
        self.repositories.push(Repository {
            name: remote.name.clone(),
            records,
        });
        Ok(count)
    }

    /// Refresh the installed snapshot from `installation`, then load all of
    /// its enabled remotes in parallel. A remote that fails to parse is
    /// reported and skipped; the others are still loaded.
    pub fn add_installation(&mut self, installation: &dyn Installation) -> Result<LoadReport> {
        self.add_installation_inner(installation, None)
    }

    /// Like [`add_installation`](Self::add_installation), but on cancellation
    /// nothing from this call is kept.
    pub fn add_installation_with_cancel(
        &mut self,
        installation: &dyn Installation,
        cancel: &CancelToken,
    ) -> Result<LoadReport> {
        self.add_installation_inner(installation, Some(cancel))
    }

    fn add_installation_inner(
        &mut self,
        installation: &dyn Installation,
        cancel: Option<&CancelToken>,
    ) -> Result<LoadReport> {
        let mut installed = self.installed.clone();
        installed.extend_from(installation)?;

        let mut pending: Vec<Remote> = Vec::new();
        for remote in installation.remotes()? {
            if remote.disabled {
                tracing::debug!(repo = %remote.name, "skipping disabled remote");
                continue;
            }
            if self.contains_repository(&remote.name)
                || pending.iter().any(|queued| queued.name == remote.name)
            {
                continue;
            }
            pending.push(remote);
        }

        let loaded: Vec<(String, Result<Vec<CatalogRecord>>)> = {
            let mut loader = CatalogLoader::new(&installed);
            if let Some(cancel) = cancel {
                loader = loader.with_cancel(cancel);
            }
            pending
                .par_iter()
                .map(|remote| (remote.name.clone(), loader.load(remote)))
                .collect()
        };

        if loaded
            .iter()
            .any(|(_, result)| matches!(result, Err(CatalogError::Cancelled)))
        {
            return Err(CatalogError::Cancelled);
        }

        let mut report = LoadReport::default();
        for (name, result) in loaded {
            match result {
                Ok(records) => {
                    report.loaded.push((name.clone(), records.len()));
                    self.repositories.push(Repository { name, records });
                }
                Err(err) => {
                    tracing::warn!(
                        installation = installation.id(),
                        repo = %name,
                        error = %err,
                        "failed to load catalog"
                    );
                    report.failed.push((name, err));
                }
            }
        }
        self.installed = installed;
        Ok(report)
    }

    /// Search one repository (`repo`) or all of them, in insertion order.
    ///
    /// The keyword is lower-cased here. Keywords shorter than the minimum
    /// length yield no hits; an unknown `repo` is always an error.
    pub fn search(&self, keyword: &str, repo: Option<&str>) -> Result<Vec<SearchHit<'_>>> {
        self.search_inner(keyword, repo, None)
    }

    pub fn search_with_cancel(
        &self,
        keyword: &str,
        repo: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<Vec<SearchHit<'_>>> {
        self.search_inner(keyword, repo, Some(cancel))
    }

    fn search_inner(
        &self,
        keyword: &str,
        repo: Option<&str>,
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<SearchHit<'_>>> {
        let scope: Vec<&Repository> = match repo {
            Some(name) => {
                let repository =
                    self.repository(name)
                        .ok_or_else(|| CatalogError::UnknownRepository {
                            name: name.to_string(),
                            known: self.repositories.iter().map(|r| r.name.clone()).collect(),
                        })?;
                vec![repository]
            }
            None => self.repositories.iter().collect(),
        };

        if keyword.chars().count() < self.min_keyword_len {
            tracing::debug!(keyword, min = self.min_keyword_len, "keyword too short");
            return Ok(Vec::new());
        }

        let keyword = keyword.to_lowercase();
        let mut hits = Vec::new();
        for repository in scope {
            for record in &repository.records {
                CancelToken::check(cancel)?;
                let match_kind = record.search(&keyword);
                if match_kind.is_match() {
                    tracing::debug!(record = %record, %match_kind, "found");
                    hits.push(SearchHit { record, match_kind });
                }
            }
        }
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{app_component, write_catalog, write_installation};

    fn two_repo_index(root: &std::path::Path) -> SearchIndex {
        let flathub = root.join("flathub");
        let beta = root.join("beta");
        write_catalog(
            &flathub,
            &[
                app_component("net.lutris.Lutris", "Lutris Games", "gaming platform"),
                app_component("org.gimp.GIMP", "GIMP", "Image editor"),
                app_component("com.valvesoftware.Steam", "Steam", "Launcher for the Steam game platform"),
            ],
        );
        write_catalog(
            &beta,
            &[app_component("org.example.GameHub", "GameHub", "Unified library")],
        );

        let mut index = SearchIndex::new(InstalledSet::new());
        index.add_repository(&Remote::new("flathub", flathub)).expect("flathub");
        index.add_repository(&Remote::new("flathub-beta", beta)).expect("beta");
        index
    }

    fn ids<'a>(hits: &[SearchHit<'a>]) -> Vec<&'a str> {
        hits.iter().map(|hit| hit.record.id()).collect()
    }

    #[test]
    fn add_repository_is_idempotent() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let mut index = two_repo_index(dir.path());
        let before: Vec<CatalogRecord> = index.records("flathub").expect("flathub").to_vec();

        // A second add with the same name never re-parses, even from another path.
        let count = index
            .add_repository(&Remote::new("flathub", dir.path().join("beta")))
            .expect("again");
        assert_eq!(count, 3);
        assert_eq!(index.records("flathub").expect("flathub"), before.as_slice());
        assert_eq!(index.repositories().count(), 2);
    }

    #[test]
    fn global_search_keeps_repository_insertion_order() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let index = two_repo_index(dir.path());

        let hits = index.search("game", None).expect("search");
        assert_eq!(
            ids(&hits),
            vec!["net.lutris.Lutris", "com.valvesoftware.Steam", "org.example.GameHub"]
        );
        assert_eq!(hits[0].match_kind, MatchKind::Name);
        assert_eq!(hits[1].match_kind, MatchKind::Summary);
    }

    #[test]
    fn scoped_search_only_returns_that_repository() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let index = two_repo_index(dir.path());

        let hits = index.search("game", Some("flathub")).expect("search");
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|hit| hit.record.repo_name() == "flathub"));
    }

    #[test]
    fn search_is_case_insensitive() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let index = two_repo_index(dir.path());

        let upper = index.search("LUTRIS", None).expect("upper");
        let lower = index.search("lutris", None).expect("lower");
        assert_eq!(upper, lower);
        assert_eq!(upper.len(), 1);
    }

    #[test]
    fn unknown_repository_is_an_error() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let index = two_repo_index(dir.path());

        let err = index.search("game", Some("fedora")).expect_err("unknown");
        match err {
            CatalogError::UnknownRepository { name, known } => {
                assert_eq!(name, "fedora");
                assert_eq!(known, vec!["flathub", "flathub-beta"]);
            }
            other => panic!("expected unknown repository, got {other:?}"),
        }
        assert!(index.search("ga", Some("fedora")).is_err());
    }

    #[test]
    fn short_keywords_return_nothing() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let index = two_repo_index(dir.path());

        assert!(index.search("ga", None).expect("short").is_empty());
        assert!(index.search("", None).expect("empty").is_empty());

        let relaxed = two_repo_index(&dir.path().join("relaxed")).with_min_keyword_len(0);
        assert_eq!(relaxed.search("ga", None).expect("relaxed").len(), 3);
    }

    #[test]
    fn cancelled_search_returns_no_partial_hits() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let index = two_repo_index(dir.path());
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = index
            .search_with_cancel("game", None, &cancel)
            .expect_err("cancelled");
        assert!(matches!(err, CatalogError::Cancelled));
    }

    #[test]
    fn add_installation_isolates_failures_and_skips_disabled() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let installation = write_installation(
            dir.path(),
            &[
                ("flathub", false, Some(vec![
                    app_component("org.gimp.GIMP", "GIMP", "Image editor"),
                    app_component("net.lutris.Lutris", "Lutris", "Game platform"),
                ])),
                ("broken", false, None),
                ("missing", false, None),
                ("empty", false, Some(Vec::new())),
                ("off", true, Some(vec![app_component("org.off.App", "Off", "Disabled")])),
            ],
            &["org.gimp.GIMP"],
        );
        std::fs::create_dir_all(installation.appstream_dir("broken")).expect("mkdir broken");
        std::fs::write(
            installation.appstream_dir("broken").join("appstream.xml.gz"),
            b"garbage",
        )
        .expect("write broken");

        let mut index = SearchIndex::new(InstalledSet::new());
        let report = index.add_installation(&installation).expect("add");

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "broken");
        assert!(report.loaded.contains(&("flathub".to_string(), 1)));
        assert!(report.loaded.contains(&("empty".to_string(), 0)));
        assert!(report.loaded.contains(&("missing".to_string(), 0)));
        assert!(!index.contains_repository("off"));
        assert!(!index.contains_repository("broken"));
        assert!(index.installed().contains("app/org.gimp.GIMP/x86_64/stable"));

        let hits = index.search("gimp", None).expect("search");
        assert!(hits.is_empty(), "installed apps are excluded");
    }

    #[test]
    fn cancelled_installation_load_leaves_index_untouched() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let installation = write_installation(
            dir.path(),
            &[(
                "flathub",
                false,
                Some(vec![app_component("org.kde.krita", "Krita", "Painting")]),
            )],
            &["org.gimp.GIMP"],
        );
        let mut index = SearchIndex::new(InstalledSet::new());
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = index
            .add_installation_with_cancel(&installation, &cancel)
            .expect_err("cancelled");
        assert!(matches!(err, CatalogError::Cancelled));
        assert_eq!(index.repositories().count(), 0);
        assert!(index.installed().is_empty());
    }

    #[test]
    fn cancelled_repository_load_leaves_index_untouched() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let mut index = two_repo_index(dir.path());
        let extra = dir.path().join("extra");
        write_catalog(&extra, &[app_component("org.kde.krita", "Krita", "Painting")]);
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = index
            .add_repository_with_cancel(&Remote::new("extra", extra), &cancel)
            .expect_err("cancelled");
        assert!(matches!(err, CatalogError::Cancelled));
        assert!(!index.contains_repository("extra"));
        assert_eq!(index.repositories().count(), 2);
        assert!(index.search("krita", None).expect("search").is_empty());
    }

    #[test]
    fn hits_serialize_with_match_type_and_repo() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let index = two_repo_index(dir.path());
        let hits = index.search("net.lutris", None).expect("search");
        let value = serde_json::to_value(&hits).expect("json");
        assert_eq!(value[0]["match_type"], "ID");
        assert_eq!(value[0]["repo"], "flathub");
        assert_eq!(value[0]["id"], "net.lutris.Lutris");
    }
}
