//! Clone URL parsing and atomic clone into the plugin root.
//!
//! A clone URL may carry a trailing `/tree/<branch>` selector (the hosting
//! provider's web URL shape); the selector is stripped before the URL is used
//! for fetching and the named branch is checked out after the clone. The
//! checkout name is the URL's last path segment minus any `.git` suffix.
//!
//! Clone is atomic from the caller's perspective: on any failure after the
//! target directory has been created, the partial directory is removed before
//! the error propagates.

use crate::core::{
    credentials::CredentialResolver,
    error::{Result, SyncError},
    repo::{remote_callbacks, CheckoutRepo},
};
use std::fs;
use std::path::{Path, PathBuf};

/// Parsed clone request: the URL to fetch from, the derived checkout name,
/// and the optional branch selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneTarget {
    pub url: String,
    pub name: String,
    pub branch: Option<String>,
}

/// Parse a clone URL, splitting off a trailing `/tree/<branch>` selector and
/// deriving the checkout name from the last path segment.
pub fn parse_clone_url(raw: &str) -> Result<CloneTarget> {
    let trimmed = raw.trim();

    let (url, branch) = match trimmed.rfind("/tree/") {
        Some(idx) => {
            let branch = trimmed[idx + "/tree/".len()..].trim_end_matches('/');
            if branch.is_empty() {
                return Err(SyncError::invalid_clone_url(raw));
            }
            (&trimmed[..idx], Some(branch.to_string()))
        }
        None => (trimmed.trim_end_matches('/'), None),
    };

    // Last path segment, tolerating scp-like `git@host:org/repo.git` URLs
    let segment = url
        .rsplit('/')
        .next()
        .and_then(|s| s.rsplit(':').next())
        .unwrap_or("");
    let name = segment.trim_end_matches(".git");
    if name.is_empty() {
        return Err(SyncError::invalid_clone_url(raw));
    }

    Ok(CloneTarget {
        url: url.to_string(),
        name: name.to_string(),
        branch,
    })
}

/// Clone `target` into `root/<name>`, rolling the partial directory back on
/// any failure. Returns the checkout path.
pub fn clone_checkout(
    root: &Path,
    target: &CloneTarget,
    resolver: &CredentialResolver,
) -> Result<PathBuf> {
    let dest = root.join(&target.name);
    if dest.exists() {
        return Err(SyncError::target_already_exists(&target.name));
    }

    match clone_into(&dest, target, resolver) {
        Ok(()) => Ok(dest),
        Err(e) => {
            // Partial clones must not survive; the caller either gets a fully
            // usable checkout or none at all
            if dest.exists() {
                if let Err(cleanup) = fs::remove_dir_all(&dest) {
                    log::error!(
                        "Failed to remove partial clone at {}: {cleanup}",
                        dest.display()
                    );
                }
            }
            Err(e)
        }
    }
}

fn clone_into(dest: &Path, target: &CloneTarget, resolver: &CredentialResolver) -> Result<()> {
    let mut opts = git2::FetchOptions::new();
    opts.remote_callbacks(remote_callbacks(resolver));

    git2::build::RepoBuilder::new()
        .fetch_options(opts)
        .clone(&target.url, dest)?;

    if let Some(branch) = &target.branch {
        let repo = CheckoutRepo::open(dest)?;
        let remote_name = repo.resolve_remote_name(&target.name)?;
        repo.switch_branch(branch, &remote_name)?;
    }
    Ok(())
}
