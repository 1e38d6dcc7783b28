//! Plugin root and repository setup utilities
//!
//! Provides functions for building a plugin root with real git checkouts and
//! file-path bare remotes, so engine behavior can be tested without touching
//! the network.

#![allow(dead_code)]

use plugin_sync::{LogSink, SyncEngine};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// A plugin root with a sibling directory for bare remotes and one for seed
/// working copies. The TempDir must be kept alive for the duration of the
/// test to prevent cleanup.
pub struct TestRoot {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub remotes: PathBuf,
    pub seeds: PathBuf,
}

impl TestRoot {
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Log sink that records every line for assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub lines: Mutex<Vec<String>>,
}

impl LogSink for RecordingSink {
    fn log_info(&self, message: &str) {
        self.lines.lock().unwrap().push(format!("info: {message}"));
    }

    fn log_warning(&self, message: &str) {
        self.lines.lock().unwrap().push(format!("warn: {message}"));
    }

    fn log_error(&self, message: &str) {
        self.lines.lock().unwrap().push(format!("error: {message}"));
    }

    fn log_success(&self, message: &str) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("success: {message}"));
    }
}

/// Sets up an empty plugin root with sibling directories for remotes and
/// seed working copies.
pub fn setup_root() -> TestRoot {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let root = temp_dir.path().join("root");
    let remotes = temp_dir.path().join("remotes");
    let seeds = temp_dir.path().join("seeds");
    fs::create_dir_all(&root).unwrap();
    fs::create_dir_all(&remotes).unwrap();
    fs::create_dir_all(&seeds).unwrap();
    TestRoot {
        temp_dir,
        root,
        remotes,
        seeds,
    }
}

/// Construct an engine over the test root with a recording sink.
pub fn engine_for(root: &TestRoot) -> (Arc<RecordingSink>, SyncEngine) {
    let sink = Arc::new(RecordingSink::default());
    let engine = SyncEngine::new(&root.root, sink.clone()).expect("engine construction failed");
    (sink, engine)
}

/// Runs a git command in `path`, panicking on failure.
pub fn git(path: &Path, args: &[&str]) {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed in {}: {}",
        path.display(),
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Creates a file and commits it in `repo_path`.
pub fn commit_file(repo_path: &Path, filename: &str, content: &str, message: &str) {
    fs::write(repo_path.join(filename), content).unwrap();
    git(repo_path, &["add", filename]);
    git(repo_path, &["commit", "-m", message]);
}

/// Initializes a git repository with test identity configured.
pub fn init_repo(path: &Path) {
    fs::create_dir_all(path).unwrap();
    git(path, &["init", "-b", "main"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "user.email", "test@example.com"]);
}

/// Creates a bare remote seeded with one commit on `main`, returning the
/// remote path. The seed working copy stays available under `seeds/<name>`
/// for pushing further history.
pub fn create_seeded_remote(test_root: &TestRoot, name: &str) -> PathBuf {
    let remote = test_root.remotes.join(format!("{name}.git"));
    git(
        &test_root.remotes,
        &["init", "--bare", "-b", "main", remote.to_str().unwrap()],
    );

    let seed = test_root.seeds.join(name);
    init_repo(&seed);
    commit_file(&seed, "plugin.txt", "v1\n", "Initial commit");
    git(&seed, &["remote", "add", "origin", remote.to_str().unwrap()]);
    git(&seed, &["push", "-u", "origin", "main"]);
    remote
}

/// Pushes one more commit to the remote through the seed working copy.
pub fn push_remote_commit(test_root: &TestRoot, name: &str, filename: &str, message: &str) {
    let seed = test_root.seeds.join(name);
    commit_file(&seed, filename, "more\n", message);
    git(&seed, &["push", "origin", "main"]);
}

/// Pushes a new branch to the remote through the seed working copy.
pub fn push_remote_branch(test_root: &TestRoot, name: &str, branch: &str) {
    let seed = test_root.seeds.join(name);
    git(&seed, &["branch", branch]);
    git(&seed, &["push", "origin", branch]);
    // Leave the seed on main
    git(&seed, &["checkout", "main"]);
}

/// Clones the named remote into the plugin root as a tracked checkout.
pub fn clone_plugin(test_root: &TestRoot, name: &str) -> PathBuf {
    let remote = test_root.remotes.join(format!("{name}.git"));
    let dest = test_root.root.join(name);
    git(
        &test_root.root,
        &[
            "clone",
            remote.to_str().unwrap(),
            dest.to_str().unwrap(),
        ],
    );
    git(&dest, &["config", "user.name", "Test User"]);
    git(&dest, &["config", "user.email", "test@example.com"]);
    dest
}

/// Reads the abbreviated HEAD commit of a repository.
pub fn head_commit(repo_path: &Path) -> String {
    let output = std::process::Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .current_dir(repo_path)
        .output()
        .expect("failed to run git rev-parse");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
