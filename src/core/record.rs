//! Checkout record and activity data structures.
//!
//! This module defines the core data structures the engine publishes to
//! callers. A [`CheckoutRecord`] is the canonical snapshot of one checkout;
//! records are immutable from the consumer's point of view and replaced
//! wholesale after every successful inspection.
//!
//! # Public API
//! - [`CheckoutRecord`]: Snapshot of one checkout's version-control state
//! - [`Activity`]: Per-checkout operator state for single-flight guarding

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Snapshot of one plugin checkout's state.
///
/// `current_commit` is never empty once the checkout has been inspected.
/// `behind_ahead` is populated only when `current_commit != latest_commit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRecord {
    pub name: String,
    pub path: PathBuf,
    pub is_tracked: bool,
    pub current_commit: String,
    pub latest_commit: String,
    pub behind_ahead: String,
    pub last_operation_message: String,
    pub latest_commit_summary: Option<String>,
    pub previous_commit_summary: Option<String>,
    pub uncommitted_change_count: usize,
    pub available_branches: Vec<String>,
    pub current_branch: String,
    pub selected_branch: String,
}

impl CheckoutRecord {
    /// Create a bare record for a freshly discovered checkout, before any
    /// inspection has run.
    pub fn discovered(name: impl Into<String>, path: PathBuf, is_tracked: bool) -> Self {
        Self {
            name: name.into(),
            path,
            is_tracked,
            current_commit: String::new(),
            latest_commit: String::new(),
            behind_ahead: String::new(),
            last_operation_message: String::new(),
            latest_commit_summary: None,
            previous_commit_summary: None,
            uncommitted_change_count: 0,
            available_branches: Vec::new(),
            current_branch: String::new(),
            selected_branch: String::new(),
        }
    }

    /// Whether the checkout is known to be up to date with its upstream.
    pub fn is_up_to_date(&self) -> bool {
        !self.latest_commit.is_empty() && self.current_commit == self.latest_commit
    }
}

/// Operator state of a single checkout.
///
/// Mutating operators claim a checkout by transitioning `Idle` to one of the
/// busy states under a single lock acquisition; a busy checkout makes a
/// second request a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Idle,
    Updating,
    Reverting,
    Switching,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovered_record_is_bare() {
        let record = CheckoutRecord::discovered("my-plugin", PathBuf::from("/plugins/my-plugin"), true);
        assert_eq!(record.name, "my-plugin");
        assert!(record.is_tracked);
        assert!(record.current_commit.is_empty());
        assert!(record.available_branches.is_empty());
        assert!(!record.is_up_to_date());
    }

    #[test]
    fn test_up_to_date_requires_known_latest() {
        let mut record = CheckoutRecord::discovered("p", PathBuf::from("/plugins/p"), true);
        record.current_commit = "abc1234".to_string();
        assert!(!record.is_up_to_date());

        record.latest_commit = "abc1234".to_string();
        assert!(record.is_up_to_date());

        record.latest_commit = "def5678".to_string();
        assert!(!record.is_up_to_date());
    }
}
