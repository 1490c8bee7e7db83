//! End-to-end tests for the relayup binary surface.
//!
//! Network-touching runs are not exercised here (the default URL points at
//! the real release host); these tests cover the argument surface and
//! early-exit paths only.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_describes_the_installer() {
    let mut cmd = Command::cargo_bin("relayup").expect("binary should build");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--install-dir"))
        .stdout(predicate::str::contains("--buffer-size"))
        .stdout(predicate::str::contains("--in-place"));
}

#[test]
fn test_version_flag_reports_crate_version() {
    let mut cmd = Command::cargo_bin("relayup").expect("binary should build");
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_zero_buffer_size_rejected_before_any_work() {
    let mut cmd = Command::cargo_bin("relayup").expect("binary should build");
    cmd.args(["--buffer-size", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--buffer-size"));
}

#[test]
fn test_unknown_flag_rejected() {
    let mut cmd = Command::cargo_bin("relayup").expect("binary should build");
    cmd.arg("--definitely-not-a-flag").assert().failure();
}
