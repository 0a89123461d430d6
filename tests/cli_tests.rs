//! CLI surface tests using the real skillet binary

mod common;

use common::TestHome;
use predicates::prelude::*;

#[test]
fn test_help_output() {
    let home = TestHome::new();
    home.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("uninstall"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("Examples:"));
}

#[test]
fn test_version_output() {
    let home = TestHome::new();
    home.cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("skillet"));
}

#[test]
fn test_unknown_command() {
    let home = TestHome::new();
    home.cmd()
        .arg("unknown")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_install_missing_source() {
    let home = TestHome::new();
    home.cmd()
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_install_unrecognized_source() {
    let home = TestHome::new();
    home.cmd()
        .args(["install", "just-one-segment"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source not recognized"));
}

#[test]
fn test_install_rejects_absolute_path_that_does_not_exist() {
    let home = TestHome::new();
    home.cmd()
        .args(["install", "/no/such/skill/dir"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source not recognized"));
}

#[test]
fn test_install_monorepo_rejects_explicit_tag() {
    let home = TestHome::new();
    // Rejected before anything is fetched, so no network is involved.
    home.cmd()
        .args(["install", "owner/repo/skills/pdf", "--tag", "v1.0.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not apply"))
        .stderr(predicate::str::contains("v1.0.0"));
}

#[test]
fn test_update_requires_id_or_all() {
    let home = TestHome::new();
    home.cmd()
        .arg("update")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_update_id_conflicts_with_all() {
    let home = TestHome::new();
    home.cmd()
        .args(["update", "my-skill", "--all"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_uninstall_unknown_skill() {
    let home = TestHome::new();
    home.cmd()
        .args(["uninstall", "missing-skill", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not installed"));
}

#[test]
fn test_list_empty() {
    let home = TestHome::new();
    home.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No skills installed."));
}

#[test]
fn test_verbose_prints_resolved_paths() {
    let home = TestHome::new();
    home.cmd()
        .args(["--verbose", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("store:"))
        .stderr(predicate::str::contains("skills dir:"));
}

#[test]
fn test_completions_bash() {
    let home = TestHome::new();
    home.cmd()
        .args(["completions", "--shell", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skillet"));
}

#[test]
fn test_completions_unknown_shell() {
    let home = TestHome::new();
    home.cmd()
        .args(["completions", "--shell", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown shell"));
}
