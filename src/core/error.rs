//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`SyncError`] which covers every failure mode of the
//! synchronization engine. It uses `thiserror` for ergonomic error definitions
//! and includes specialized constructors for common failure scenarios.
//!
//! # Public API
//! - [`SyncError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, SyncError>`
//!
//! # Error Categories
//! - **Git operations**: git2 library errors, remote resolution, tracking state
//! - **Filesystem**: I/O errors, vanished directories, UTF-8 issues
//! - **Operator failures**: revert at root, unknown branches, clone collisions
//! - **Orchestration**: refresh single-flight timeout

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for the synchronization engine
#[derive(Error, Debug)]
pub enum SyncError {
    // Git repository errors
    #[error("Git repository error: {0}")]
    Git(#[from] git2::Error),

    #[error("Invalid UTF-8 in repository data")]
    InvalidUtf8,

    // Filesystem errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Checkout directory does not exist: {path}")]
    DirectoryNotFound { path: PathBuf },

    // Remote resolution errors
    #[error("Cannot pick a remote for '{name}': multiple remotes configured and none is 'origin'")]
    RemoteAmbiguous { name: String },

    #[error("Branch '{branch}' has no tracking branch to pull from")]
    NoTrackingBranch { branch: String },

    // Operator failures
    #[error("Cannot revert '{name}': HEAD has no parent commit")]
    NoParentCommit { name: String },

    #[error("Branch '{branch}' does not exist locally or on the remote")]
    BranchNotFound { branch: String },

    #[error("Branch '{branch}' has diverged from its upstream and cannot fast-forward")]
    NonFastForward { branch: String },

    #[error("A checkout named '{name}' already exists")]
    TargetAlreadyExists { name: String },

    #[error("Cannot derive a checkout name from clone URL '{url}'")]
    InvalidCloneUrl { url: String },

    // Orchestration errors
    #[error("A refresh is still running and did not observe cancellation in time")]
    RefreshBusy,

    // JSON serialization errors (host config)
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using SyncError
pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    /// Create a directory-not-found error
    pub fn directory_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DirectoryNotFound { path: path.into() }
    }

    /// Create a remote-ambiguous error for a checkout
    pub fn remote_ambiguous(name: impl Into<String>) -> Self {
        Self::RemoteAmbiguous { name: name.into() }
    }

    /// Create a no-tracking-branch error
    pub fn no_tracking_branch(branch: impl Into<String>) -> Self {
        Self::NoTrackingBranch {
            branch: branch.into(),
        }
    }

    /// Create a no-parent-commit error for a checkout
    pub fn no_parent_commit(name: impl Into<String>) -> Self {
        Self::NoParentCommit { name: name.into() }
    }

    /// Create a branch-not-found error
    pub fn branch_not_found(branch: impl Into<String>) -> Self {
        Self::BranchNotFound {
            branch: branch.into(),
        }
    }

    /// Create a non-fast-forward error
    pub fn non_fast_forward(branch: impl Into<String>) -> Self {
        Self::NonFastForward {
            branch: branch.into(),
        }
    }

    /// Create a target-already-exists error
    pub fn target_already_exists(name: impl Into<String>) -> Self {
        Self::TargetAlreadyExists { name: name.into() }
    }

    /// Create an invalid-clone-url error
    pub fn invalid_clone_url(url: impl Into<String>) -> Self {
        Self::InvalidCloneUrl { url: url.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::RefreshBusy;
        assert_eq!(
            err.to_string(),
            "A refresh is still running and did not observe cancellation in time"
        );
    }

    #[test]
    fn test_directory_not_found_error() {
        let err = SyncError::directory_not_found("/plugins/gone");
        assert_eq!(
            err.to_string(),
            "Checkout directory does not exist: /plugins/gone"
        );
    }

    #[test]
    fn test_no_parent_commit_error() {
        let err = SyncError::no_parent_commit("my-plugin");
        assert!(err.to_string().contains("my-plugin"));
        assert!(err.to_string().contains("no parent commit"));
    }

    #[test]
    fn test_branch_not_found_error() {
        let err = SyncError::branch_not_found("feature-x");
        assert_eq!(
            err.to_string(),
            "Branch 'feature-x' does not exist locally or on the remote"
        );
    }

    #[test]
    fn test_target_already_exists_error() {
        let err = SyncError::target_already_exists("repo");
        assert!(err.to_string().contains("'repo'"));
    }

    #[test]
    fn test_invalid_clone_url_error() {
        let err = SyncError::invalid_clone_url("https://example/");
        assert!(err.to_string().contains("https://example/"));
    }
}
