mod common;

use assert_cmd::prelude::*;
use common::*;
use predicates::prelude::*;
use std::process::Command;

fn plugin_sync() -> Command {
    Command::cargo_bin("plugin-sync").expect("binary not built")
}

#[test]
fn list_shows_tracked_and_manual_checkouts() {
    let test_root = setup_root();
    create_seeded_remote(&test_root, "plugin-a");
    clone_plugin(&test_root, "plugin-a");
    std::fs::create_dir(test_root.root.join("hand-installed")).unwrap();

    plugin_sync()
        .args(["--root", test_root.root.to_str().unwrap(), "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("plugin-a"))
        .stdout(predicate::str::contains("hand-installed"));
}

#[test]
fn list_on_empty_root() {
    let test_root = setup_root();

    plugin_sync()
        .args(["--root", test_root.root.to_str().unwrap(), "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tracked checkouts found"));
}

#[test]
fn refresh_reports_progress() {
    let test_root = setup_root();
    create_seeded_remote(&test_root, "plugin-a");
    clone_plugin(&test_root, "plugin-a");

    plugin_sync()
        .args(["--root", test_root.root.to_str().unwrap(), "refresh", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[1/1]"))
        .stdout(predicate::str::contains("Refreshed 1 of 1"));
}

#[test]
fn delete_missing_checkout_fails() {
    let test_root = setup_root();

    plugin_sync()
        .args([
            "--root",
            test_root.root.to_str().unwrap(),
            "delete",
            "ghost",
            "--yes",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn update_unknown_name_is_a_silent_no_op() {
    let test_root = setup_root();

    plugin_sync()
        .args(["--root", test_root.root.to_str().unwrap(), "update", "ghost"])
        .assert()
        .success();
}

#[test]
fn missing_root_is_an_error() {
    plugin_sync()
        .args(["--root", "/definitely/not/a/root", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
