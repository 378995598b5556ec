// SPDX-License-Identifier: MIT OR Apache-2.0

use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

const LUTRIS: &str = r#"<component type="desktop-application">
  <id>net.lutris.Lutris</id>
  <name>Lutris Games</name>
  <summary>gaming platform</summary>
  <description><p>Play all your games.</p></description>
  <developer_name>Lutris Team</developer_name>
  <icon type="remote" width="128" height="128">https://example.org/lutris.png</icon>
  <icon type="cached" width="64" height="64">net.lutris.Lutris.png</icon>
  <url type="homepage">https://lutris.net</url>
  <categories><category>Game</category></categories>
  <releases><release version="0.5.17"/></releases>
  <bundle type="flatpak">app/net.lutris.Lutris/x86_64/stable</bundle>
</component>"#;

const GIMP: &str = r#"<component type="desktop-application">
  <id>org.gimp.GIMP</id>
  <name>GNU Image Manipulation Program</name>
  <summary>Create images and edit photographs</summary>
  <bundle type="flatpak">app/org.gimp.GIMP/x86_64/stable</bundle>
</component>"#;

const STEAM: &str = r#"<component type="desktop-application">
  <id>com.valvesoftware.Steam</id>
  <name>Steam</name>
  <summary>Launcher for the Steam software distribution service</summary>
  <bundle type="flatpak">app/com.valvesoftware.Steam/x86_64/stable</bundle>
</component>"#;

const GAMEHUB: &str = r#"<component type="desktop-application">
  <id>com.github.tkashkin.gamehub</id>
  <name>GameHub</name>
  <summary>Unified library for all your games</summary>
  <bundle type="flatpak">app/com.github.tkashkin.gamehub/x86_64/beta</bundle>
</component>"#;

fn write_catalog(dir: &Path, components: &[&str]) {
    fs::create_dir_all(dir).expect("create appstream dir");
    let xml = format!(
        "<?xml version=\"1.0\"?>\n<components version=\"0.14\">\n{}\n</components>\n",
        components.join("\n")
    );
    let file = fs::File::create(dir.join("appstream.xml.gz")).expect("create catalog");
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(xml.as_bytes()).expect("write catalog");
    encoder.finish().expect("finish gzip");
}

fn appstream_dir(root: &Path, remote: &str) -> std::path::PathBuf {
    root.join("appstream").join(remote).join("x86_64").join("active")
}

/// flathub (lutris, gimp, steam), flathub-beta (gamehub), empty (no catalog);
/// gimp is installed.
fn fixture_installation() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();

    fs::create_dir_all(root.join("repo")).expect("create repo");
    fs::write(
        root.join("repo/config"),
        "[core]\nrepo_version=1\n\n\
         [remote \"flathub\"]\nurl=https://dl.flathub.org/repo/\nxa.title=Flathub\n\n\
         [remote \"flathub-beta\"]\nurl=https://dl.flathub.org/beta-repo/\n\n\
         [remote \"empty\"]\nurl=https://example.org/empty/\n",
    )
    .expect("write repo config");

    write_catalog(&appstream_dir(root, "flathub"), &[LUTRIS, GIMP, STEAM]);
    write_catalog(&appstream_dir(root, "flathub-beta"), &[GAMEHUB]);
    fs::create_dir_all(root.join("app/org.gimp.GIMP/x86_64/stable/active"))
        .expect("create installed app");

    dir
}

fn flatquery(installation: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("flatquery"));
    cmd.current_dir(installation)
        .env("HOME", installation)
        .env_remove("RUST_LOG")
        .args(["--arch", "x86_64", "--installation"])
        .arg(installation);
    cmd
}

fn search_json(installation: &Path, args: &[&str]) -> Vec<Value> {
    let assert = flatquery(installation)
        .args(["--format", "json", "--compact", "search"])
        .args(args)
        .assert()
        .success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    serde_json::from_str(&out).expect("json")
}

#[test]
fn search_classifies_matches_by_priority() {
    let dir = fixture_installation();

    let by_name = search_json(dir.path(), &["lutris"]);
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0]["match_type"], "NAME");

    let by_summary = search_json(dir.path(), &["gaming"]);
    assert_eq!(by_summary[0]["id"], "net.lutris.Lutris");
    assert_eq!(by_summary[0]["match_type"], "SUMMARY");

    let by_id = search_json(dir.path(), &["net."]);
    assert_eq!(by_id[0]["match_type"], "ID");
}

#[test]
fn search_reports_every_record_field() {
    let dir = fixture_installation();
    let results = search_json(dir.path(), &["LUTRIS"]);
    let lutris = &results[0];

    assert_eq!(lutris["name"], "Lutris Games");
    assert_eq!(lutris["version"], "0.5.17");
    assert_eq!(lutris["description"], "Play all your games.");
    assert_eq!(lutris["developer"], "Lutris Team");
    assert_eq!(lutris["icon_url"], "https://example.org/lutris.png");
    assert_eq!(lutris["icon_filename"], "net.lutris.Lutris.png");
    assert!(lutris["icon_path_64"]
        .as_str()
        .expect("icon path")
        .ends_with("appstream/flathub/x86_64/active/icons/flatpak/64x64"));
    assert_eq!(lutris["urls"]["homepage"], "https://lutris.net");
    assert_eq!(lutris["urls"]["donation"], "");
    assert_eq!(lutris["categories"][0], "game");
    assert_eq!(lutris["bundle_id"], "app/net.lutris.Lutris/x86_64/stable");
    assert_eq!(lutris["repo"], "flathub");
}

#[test]
fn installed_applications_are_never_listed() {
    let dir = fixture_installation();
    let results = search_json(dir.path(), &["gimp"]);
    assert!(results.is_empty());
}

#[test]
fn global_search_follows_remote_order_and_scoped_search_filters() {
    let dir = fixture_installation();

    let all = search_json(dir.path(), &["game"]);
    let ids: Vec<&str> = all.iter().filter_map(|r| r["id"].as_str()).collect();
    assert_eq!(
        ids,
        vec!["net.lutris.Lutris", "com.github.tkashkin.gamehub"]
    );

    let scoped = search_json(dir.path(), &["game", "--repo", "flathub-beta"]);
    assert_eq!(scoped.len(), 1);
    assert!(scoped.iter().all(|r| r["repo"] == "flathub-beta"));
}

#[test]
fn limit_truncates_results() {
    let dir = fixture_installation();
    let results = search_json(dir.path(), &["game", "-m", "1"]);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], "net.lutris.Lutris");
}

#[test]
fn short_keywords_return_empty_results() {
    let dir = fixture_installation();
    assert!(search_json(dir.path(), &["ga"]).is_empty());
    assert_eq!(search_json(dir.path(), &["ga", "--min-length", "2"]).len(), 2);
}

#[test]
fn unknown_repository_fails() {
    let dir = fixture_installation();
    flatquery(dir.path())
        .args(["search", "game", "--repo", "fedora"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown repository: 'fedora'"));
}

#[test]
fn corrupt_catalog_only_skips_that_remote() {
    let dir = fixture_installation();
    fs::write(
        appstream_dir(dir.path(), "flathub-beta").join("appstream.xml.gz"),
        b"definitely not gzip",
    )
    .expect("corrupt catalog");

    let assert = flatquery(dir.path())
        .args(["--format", "json", "search", "game"])
        .assert()
        .success()
        .stderr(predicate::str::contains("skipping remote 'flathub-beta'"));
    let out = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let results: Vec<Value> = serde_json::from_str(&out).expect("json");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["repo"], "flathub");
}

#[test]
fn text_output_lists_fields_and_separator() {
    let dir = fixture_installation();
    flatquery(dir.path())
        .env("NO_COLOR", "1")
        .args(["--format", "text", "search", "steam"])
        .assert()
        .success()
        .stdout(predicate::str::contains("com.valvesoftware.Steam"))
        .stdout(predicate::str::contains("Version:"))
        .stdout(predicate::str::contains("None"))
        .stdout(predicate::str::contains("-".repeat(50)));
}

#[test]
fn text_output_explains_short_keyword() {
    let dir = fixture_installation();
    flatquery(dir.path())
        .env("NO_COLOR", "1")
        .args(["search", "st"])
        .assert()
        .success()
        .stdout(predicate::str::contains("at least 3 characters"));
}
