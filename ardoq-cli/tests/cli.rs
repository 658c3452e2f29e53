use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const MANIFEST: &str = r#"
workspace: ws1
components:
  - key: api
    name: Billing API
    typeId: T1
references: []
"#;

/// `ardoq` with an isolated home and no ambient credentials.
fn ardoq_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ardoq"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("ARDOQ_API_HOST")
        .env_remove("ARDOQ_API_TOKEN")
        .env_remove("ARDOQ_ORG_LABEL")
        .env_remove("RUST_LOG");
    cmd
}

fn write_manifest(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("manifest.yaml");
    fs::write(&path, contents).expect("write manifest");
    path
}

fn write_config(home: &Path, contents: &str) {
    let dir = home.join(".ardoq");
    fs::create_dir_all(&dir).expect("config dir");
    fs::write(dir.join("config.yaml"), contents).expect("write config");
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().expect("home");
    ardoq_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("sync"))
        .stdout(contains("diff"))
        .stdout(contains("find"))
        .stdout(contains("delete"))
        .stdout(contains("config"));
}

#[test]
fn sync_without_token_explains_how_to_set_one() {
    let home = TempDir::new().expect("home");
    let manifest = write_manifest(home.path(), MANIFEST);

    ardoq_cmd(home.path())
        .arg("sync")
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(contains("invalid ardoq configuration"))
        .stderr(contains("ARDOQ_API_TOKEN"));
}

#[test]
fn default_host_requires_org() {
    let home = TempDir::new().expect("home");
    let manifest = write_manifest(home.path(), MANIFEST);

    ardoq_cmd(home.path())
        .env("ARDOQ_API_TOKEN", "secret-token-1234")
        .arg("diff")
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(contains("ARDOQ_ORG_LABEL"));
}

#[test]
fn malformed_manifest_is_reported_with_its_path() {
    let home = TempDir::new().expect("home");
    let manifest = write_manifest(home.path(), "workspace: [unterminated");

    ardoq_cmd(home.path())
        .arg("sync")
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(contains("failed to load manifest"))
        .stderr(contains("manifest.yaml"));
}

#[test]
fn missing_manifest_fails_before_connecting() {
    let home = TempDir::new().expect("home");

    ardoq_cmd(home.path())
        .args(["sync", "does-not-exist.yaml", "--simulate"])
        .assert()
        .failure()
        .stderr(contains("does-not-exist.yaml"))
        .stderr(contains("ARDOQ_API_TOKEN").not());
}

#[test]
fn unreachable_host_surfaces_network_error() {
    let home = TempDir::new().expect("home");
    let manifest = write_manifest(home.path(), MANIFEST);
    write_config(
        home.path(),
        "host: http://127.0.0.1:9\ntoken: secret-token-1234\ntimeout_secs: 2\n",
    );

    ardoq_cmd(home.path())
        .args(["sync", "--simulate"])
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(contains("sync failed for workspace 'ws1'"));
}

#[test]
fn config_show_masks_token() {
    let home = TempDir::new().expect("home");
    write_config(home.path(), "org: acme\n");

    ardoq_cmd(home.path())
        .env("ARDOQ_API_TOKEN", "secret-token-1234")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("...1234"))
        .stdout(contains("org:     acme"))
        .stdout(contains("secret-token").not());
}

#[test]
fn config_show_flags_incomplete_settings() {
    let home = TempDir::new().expect("home");

    ardoq_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("<not set>"))
        .stdout(contains("API token expected"));
}

#[test]
fn config_path_points_into_home() {
    let home = TempDir::new().expect("home");
    let expected = home.path().join(".ardoq").join("config.yaml");

    ardoq_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(contains(expected.display().to_string()));
}

#[test]
fn find_requires_a_criterion() {
    let home = TempDir::new().expect("home");
    write_config(home.path(), "token: t-0001\norg: acme\n");

    ardoq_cmd(home.path())
        .args(["find", "ws1"])
        .assert()
        .failure()
        .stderr(contains("provide --name or --field"));
}
