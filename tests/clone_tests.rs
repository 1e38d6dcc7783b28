mod common;

use common::*;
use plugin_sync::SyncError;

#[test]
fn clone_creates_populated_record() {
    let test_root = setup_root();
    let remote = create_seeded_remote(&test_root, "repo");

    let (sink, engine) = engine_for(&test_root);
    engine.clone_checkout(remote.to_str().unwrap()).unwrap();

    let record = engine.checkout("repo").unwrap();
    assert!(record.is_tracked);
    assert!(!record.current_commit.is_empty());
    assert_eq!(record.current_branch, "main");
    assert!(record.last_operation_message.starts_with("Cloned from "));
    assert!(test_root.root.join("repo").join(".git").exists());

    let lines = sink.lines.lock().unwrap();
    assert!(lines.iter().any(|l| l.starts_with("success:")));
}

#[test]
fn clone_name_strips_git_suffix() {
    let test_root = setup_root();
    let remote = create_seeded_remote(&test_root, "my-plugin");

    let (_sink, engine) = engine_for(&test_root);
    engine.clone_checkout(remote.to_str().unwrap()).unwrap();

    // remotes/my-plugin.git clones as checkout "my-plugin"
    assert!(engine.checkout("my-plugin").is_some());
    assert!(test_root.root.join("my-plugin").is_dir());
}

#[test]
fn clone_with_tree_selector_checks_out_branch() {
    let test_root = setup_root();
    let remote = create_seeded_remote(&test_root, "repo");
    push_remote_branch(&test_root, "repo", "feature-x");

    let (_sink, engine) = engine_for(&test_root);
    let url = format!("{}/tree/feature-x", remote.to_str().unwrap());
    engine.clone_checkout(&url).unwrap();

    let record = engine.checkout("repo").unwrap();
    assert_eq!(record.current_branch, "feature-x");
}

#[test]
fn clone_failure_leaves_no_partial_directory() {
    let test_root = setup_root();
    let remote = create_seeded_remote(&test_root, "repo");

    // The clone itself succeeds, then the selector checkout fails; the
    // partially created target must be rolled back
    let url = format!("{}/tree/no-such-branch", remote.to_str().unwrap());
    let (_sink, engine) = engine_for(&test_root);
    let result = engine.clone_checkout(&url);

    assert!(matches!(result, Err(SyncError::BranchNotFound { .. })));
    assert!(!test_root.root.join("repo").exists());
    assert!(engine.checkout("repo").is_none());
}

#[test]
fn clone_of_empty_remote_rolls_back() {
    let test_root = setup_root();
    let remote = test_root.remotes.join("empty.git");
    git(
        &test_root.remotes,
        &["init", "--bare", "-b", "main", remote.to_str().unwrap()],
    );

    // The clone itself succeeds but the unborn HEAD cannot be inspected; the
    // checkout must not be left on disk without a record
    let (_sink, engine) = engine_for(&test_root);
    let result = engine.clone_checkout(remote.to_str().unwrap());

    assert!(result.is_err());
    assert!(!test_root.root.join("empty").exists());
    assert!(engine.checkout("empty").is_none());
}

#[test]
fn clone_from_missing_source_fails_cleanly() {
    let test_root = setup_root();
    let url = test_root.remotes.join("missing.git");

    let (_sink, engine) = engine_for(&test_root);
    let result = engine.clone_checkout(url.to_str().unwrap());

    assert!(result.is_err());
    assert!(!test_root.root.join("missing").exists());
}

#[test]
fn clone_collision_is_a_named_error() {
    let test_root = setup_root();
    let remote = create_seeded_remote(&test_root, "repo");
    clone_plugin(&test_root, "repo");

    let (_sink, engine) = engine_for(&test_root);
    let result = engine.clone_checkout(remote.to_str().unwrap());
    assert!(matches!(
        result,
        Err(SyncError::TargetAlreadyExists { ref name }) if name == "repo"
    ));
}
