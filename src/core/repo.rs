//! Git repository operations for a single checkout.
//!
//! This module provides a high-level interface to git operations through the
//! [`CheckoutRepo`] struct. It wraps the `git2` library with the operations
//! the synchronization engine needs: pure state inspection, fetch with
//! credential resolution, fast-forward update, hard-reset revert, and branch
//! switching.
//!
//! # Public API
//! - [`CheckoutRepo`]: Main interface for one checkout's git repository
//! - [`Inspection`]: Result of a pure state read, merged into a record
//! - [`UpdateOutcome`]: Fast-forward result (already up to date vs new tip)
//!
//! # Key Features
//! - **Pure inspection**: [`CheckoutRepo::inspect`] never mutates repository state
//! - **Remote resolution**: tracked branch's remote, then `origin`, then the
//!   sole remaining remote
//! - **Snap-to-remote switching**: branch switches hard-reset to the upstream tip

use crate::core::{
    credentials::CredentialResolver,
    error::{Result, SyncError},
    record::CheckoutRecord,
};
use git2::{BranchType, Oid, Repository, StatusOptions};
use std::collections::BTreeSet;
use std::path::Path;

/// Abbreviate an object id the way `git log --oneline` does.
pub(crate) fn short_id(oid: Oid) -> String {
    oid.to_string()[..7].to_string()
}

/// Build remote callbacks that route plaintext auth through the credential
/// resolver and ssh auth through the agent.
pub(crate) fn remote_callbacks(resolver: &CredentialResolver) -> git2::RemoteCallbacks<'_> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(move |url, username_from_url, allowed| {
        if allowed.contains(git2::CredentialType::USER_PASS_PLAINTEXT) {
            let credentials = resolver.resolve(url);
            if let (Some(username), Some(password)) =
                (credentials.username, credentials.password)
            {
                return git2::Cred::userpass_plaintext(&username, &password);
            }
        }
        if allowed.contains(git2::CredentialType::SSH_KEY) {
            if let Some(username) = username_from_url {
                return git2::Cred::ssh_key_from_agent(username);
            }
        }
        git2::Cred::default()
    });
    callbacks
}

/// Result of a fast-forward update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    AlreadyUpToDate,
    FastForwarded { tip: String },
}

impl UpdateOutcome {
    /// Human-readable outcome for the record's operation message.
    pub fn message(&self) -> String {
        match self {
            Self::AlreadyUpToDate => "Already up to date".to_string(),
            Self::FastForwarded { tip } => format!("Updated to {tip}"),
        }
    }
}

/// Canonical snapshot of a checkout's version-control state, produced by
/// [`CheckoutRepo::inspect`] and merged wholesale into a [`CheckoutRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub current_commit: String,
    pub latest_commit: String,
    pub behind_ahead: String,
    pub latest_commit_summary: Option<String>,
    pub previous_commit_summary: Option<String>,
    pub uncommitted_change_count: usize,
    pub available_branches: Vec<String>,
    pub current_branch: String,
}

impl Inspection {
    /// Replace the version-control fields of `record` with this snapshot.
    pub fn apply_to(self, record: &mut CheckoutRecord) {
        record.current_commit = self.current_commit;
        record.latest_commit = self.latest_commit;
        record.behind_ahead = self.behind_ahead;
        record.latest_commit_summary = self.latest_commit_summary;
        record.previous_commit_summary = self.previous_commit_summary;
        record.uncommitted_change_count = self.uncommitted_change_count;
        record.available_branches = self.available_branches;
        record.current_branch = self.current_branch;
    }
}

pub struct CheckoutRepo {
    repo: Repository,
}

impl CheckoutRepo {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path)?;
        Ok(CheckoutRepo { repo })
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;

        if let Some(branch_name) = head.shorthand() {
            if head.is_branch() {
                Ok(branch_name.to_string())
            } else {
                // Detached HEAD
                match head.target() {
                    Some(oid) => Ok(format!("detached at {}", short_id(oid))),
                    None => Ok("-none-".to_string()),
                }
            }
        } else {
            Ok("-none-".to_string())
        }
    }

    /// Compute the canonical state snapshot. This is a pure read: it must be
    /// safe to call repeatedly and never mutates repository state.
    pub fn inspect(&self) -> Result<Inspection> {
        let head = self.repo.head()?;
        let head_commit = head.peel_to_commit()?;
        let current_commit = short_id(head_commit.id());
        let current_branch = self.current_branch()?;

        let available_branches = self.branch_names()?;

        // Upstream tip, when a tracking branch exists; otherwise there is
        // nothing to compare against
        let upstream_oid = self.upstream_oid()?;
        let (latest_commit, latest_commit_summary, behind_ahead) = match upstream_oid {
            Some(oid) if oid != head_commit.id() => {
                let upstream_commit = self.repo.find_commit(oid)?;
                let summary = upstream_commit.summary().map(|s| s.to_string());
                let (ahead, behind) = self.repo.graph_ahead_behind(head_commit.id(), oid)?;
                (
                    short_id(oid),
                    summary,
                    format!("{behind} behind, {ahead} ahead"),
                )
            }
            Some(oid) => (
                short_id(oid),
                head_commit.summary().map(|s| s.to_string()),
                String::new(),
            ),
            None => (
                current_commit.clone(),
                head_commit.summary().map(|s| s.to_string()),
                String::new(),
            ),
        };

        let previous_commit_summary = head_commit
            .parent(0)
            .ok()
            .and_then(|parent| parent.summary().map(|s| s.to_string()));

        let mut opts = StatusOptions::new();
        opts.include_untracked(true);
        opts.include_ignored(false);
        let uncommitted_change_count = self.repo.statuses(Some(&mut opts))?.len();

        Ok(Inspection {
            current_commit,
            latest_commit,
            behind_ahead,
            latest_commit_summary,
            previous_commit_summary,
            uncommitted_change_count,
            available_branches,
            current_branch,
        })
    }

    /// Deduplicated sorted union of local and remote branch names, with the
    /// remote prefix stripped and the remote's symbolic HEAD excluded.
    fn branch_names(&self) -> Result<Vec<String>> {
        let mut names = BTreeSet::new();

        for item in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = item?;
            if let Some(name) = branch.name()? {
                names.insert(name.to_string());
            }
        }

        for item in self.repo.branches(Some(BranchType::Remote))? {
            let (branch, _) = item?;
            if let Some(name) = branch.name()? {
                if name.ends_with("/HEAD") {
                    continue;
                }
                let stripped = name.split_once('/').map(|(_, rest)| rest).unwrap_or(name);
                names.insert(stripped.to_string());
            }
        }

        Ok(names.into_iter().collect())
    }

    /// Tip of the current branch's upstream, or `None` when HEAD is detached
    /// or no tracking branch is configured.
    fn upstream_oid(&self) -> Result<Option<Oid>> {
        let head = match self.repo.head() {
            Ok(head) if head.is_branch() => head,
            _ => return Ok(None),
        };
        let branch_name = match head.shorthand() {
            Some(name) => name,
            None => return Ok(None),
        };
        let local_branch = match self.repo.find_branch(branch_name, BranchType::Local) {
            Ok(branch) => branch,
            Err(_) => return Ok(None),
        };
        let upstream = match local_branch.upstream() {
            Ok(upstream) => upstream,
            Err(_) => return Ok(None), // No upstream configured
        };
        Ok(upstream.get().target())
    }

    /// Pick the remote to fetch from: the tracked branch's configured remote,
    /// then `origin`, then the sole remaining remote.
    pub fn resolve_remote_name(&self, checkout_name: &str) -> Result<String> {
        if let Ok(head) = self.repo.head() {
            if head.is_branch() {
                if let Some(refname) = head.name() {
                    if let Ok(buf) = self.repo.branch_upstream_remote(refname) {
                        if let Some(remote) = buf.as_str() {
                            return Ok(remote.to_string());
                        }
                    }
                }
            }
        }

        let remotes = self.repo.remotes()?;
        let names: Vec<&str> = remotes.iter().flatten().collect();
        if names.contains(&"origin") {
            return Ok("origin".to_string());
        }
        match names.as_slice() {
            [single] => Ok(single.to_string()),
            _ => Err(SyncError::remote_ambiguous(checkout_name)),
        }
    }

    /// Fetch from the resolved remote, then auto-establish tracking when HEAD
    /// has no upstream but a like-named remote branch exists.
    pub fn fetch(&self, resolver: &CredentialResolver, checkout_name: &str) -> Result<String> {
        let remote_name = self.resolve_remote_name(checkout_name)?;
        let mut remote = self.repo.find_remote(&remote_name)?;

        let mut opts = git2::FetchOptions::new();
        opts.remote_callbacks(remote_callbacks(resolver));
        // Empty refspec list fetches the remote's configured refspecs
        remote.fetch(&[] as &[&str], Some(&mut opts), None)?;
        drop(remote);

        self.ensure_tracking(&remote_name)?;
        Ok(remote_name)
    }

    /// Set the current branch's upstream to the like-named remote branch when
    /// no tracking is configured yet.
    fn ensure_tracking(&self, remote_name: &str) -> Result<()> {
        let head = match self.repo.head() {
            Ok(head) if head.is_branch() => head,
            _ => return Ok(()),
        };
        let branch_name = match head.shorthand() {
            Some(name) => name.to_string(),
            None => return Ok(()),
        };

        let mut local_branch = self.repo.find_branch(&branch_name, BranchType::Local)?;
        if local_branch.upstream().is_ok() {
            return Ok(());
        }

        let remote_ref = format!("{remote_name}/{branch_name}");
        if self.repo.find_branch(&remote_ref, BranchType::Remote).is_ok() {
            log::debug!("Establishing tracking {branch_name} -> {remote_ref}");
            local_branch.set_upstream(Some(&remote_ref))?;
        }
        Ok(())
    }

    /// Fast-forward the current branch to its upstream tip.
    pub fn fast_forward(&self) -> Result<UpdateOutcome> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(SyncError::no_tracking_branch(self.current_branch()?));
        }
        let branch_name = head
            .shorthand()
            .ok_or(SyncError::InvalidUtf8)?
            .to_string();

        let local_branch = self.repo.find_branch(&branch_name, BranchType::Local)?;
        let upstream = local_branch
            .upstream()
            .map_err(|_| SyncError::no_tracking_branch(&branch_name))?;
        let upstream_oid = upstream
            .get()
            .target()
            .ok_or_else(|| SyncError::no_tracking_branch(&branch_name))?;

        let annotated = self.repo.find_annotated_commit(upstream_oid)?;
        let (analysis, _) = self.repo.merge_analysis(&[&annotated])?;

        if analysis.is_up_to_date() {
            return Ok(UpdateOutcome::AlreadyUpToDate);
        }
        if analysis.is_fast_forward() {
            let refname = format!("refs/heads/{branch_name}");
            let mut reference = self.repo.find_reference(&refname)?;
            reference.set_target(upstream_oid, "fast-forward")?;
            self.repo.set_head(&refname)?;
            let mut checkout = git2::build::CheckoutBuilder::new();
            checkout.force();
            self.repo.checkout_head(Some(&mut checkout))?;
            return Ok(UpdateOutcome::FastForwarded {
                tip: short_id(upstream_oid),
            });
        }
        Err(SyncError::non_fast_forward(branch_name))
    }

    /// Hard-reset HEAD to its immediate parent commit. Fails when HEAD is the
    /// root commit.
    pub fn revert_to_parent(&self, checkout_name: &str) -> Result<String> {
        let head_commit = self.repo.head()?.peel_to_commit()?;
        let parent = head_commit
            .parent(0)
            .map_err(|_| SyncError::no_parent_commit(checkout_name))?;
        let parent_id = parent.id();

        self.repo
            .reset(parent.as_object(), git2::ResetType::Hard, None)?;
        Ok(short_id(parent_id))
    }

    /// Check out `branch`, creating a local tracking branch from the
    /// like-named remote branch when it does not exist locally. When the
    /// branch has an upstream, snap to the upstream tip, discarding local
    /// divergence on that branch. Returns the resulting HEAD commit id.
    pub fn switch_branch(&self, branch: &str, remote_name: &str) -> Result<String> {
        if self.repo.find_branch(branch, BranchType::Local).is_err() {
            let remote_ref = format!("{remote_name}/{branch}");
            let remote_branch = self
                .repo
                .find_branch(&remote_ref, BranchType::Remote)
                .map_err(|_| SyncError::branch_not_found(branch))?;
            let target = remote_branch.get().peel_to_commit()?;
            let mut created = self.repo.branch(branch, &target, false)?;
            created.set_upstream(Some(&remote_ref))?;
        }

        let refname = format!("refs/heads/{branch}");
        self.repo.set_head(&refname)?;
        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.force();
        self.repo.checkout_head(Some(&mut checkout))?;

        // Switching always snaps to the remote state when an upstream exists
        let local_branch = self.repo.find_branch(branch, BranchType::Local)?;
        if let Ok(upstream) = local_branch.upstream() {
            if let Some(upstream_oid) = upstream.get().target() {
                let target = self.repo.find_object(upstream_oid, None)?;
                self.repo.reset(&target, git2::ResetType::Hard, None)?;
                return Ok(short_id(upstream_oid));
            }
        }

        let head_commit = self.repo.head()?.peel_to_commit()?;
        Ok(short_id(head_commit.id()))
    }
}
