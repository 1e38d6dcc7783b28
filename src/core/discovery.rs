//! Checkout discovery: classifying root subdirectories.
//!
//! Scans the plugin root folder and classifies each immediate subdirectory as
//! git-tracked (a `.git` marker exists directly under it) or manually placed.
//! Discovery is a pure filesystem scan with no side effects; directories that
//! vanish mid-scan are skipped rather than failing the whole scan.

use crate::core::{error::Result, record::CheckoutRecord};
use std::fs;
use std::path::Path;

/// Scan `root` for git-tracked checkouts and return bare records for them.
pub fn discover_tracked(root: &Path) -> Result<Vec<CheckoutRecord>> {
    let mut records = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = match entry {
            Ok(entry) => entry,
            // A directory removed between readdir and stat is a benign race
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {e}", root.display());
                continue;
            }
        };

        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if !path.join(".git").exists() {
            continue;
        }

        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => {
                log::warn!("Skipping checkout with non-UTF-8 name: {}", path.display());
                continue;
            }
        };

        records.push(CheckoutRecord::discovered(name, path, true));
    }

    records.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(records)
}

/// Scan `root` for manually placed (untracked) checkout directories.
///
/// These are reported once at engine construction as warnings; they are never
/// targets of mutating operators.
pub fn discover_manual(root: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {e}", root.display());
                continue;
            }
        };

        let path = entry.path();
        if !path.is_dir() || path.join(".git").exists() {
            continue;
        }

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        }
    }

    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_git_dir(root: &Path, name: &str) -> std::path::PathBuf {
        let path = root.join(name);
        fs::create_dir_all(path.join(".git")).unwrap();
        path
    }

    #[test]
    fn test_discover_tracked_finds_git_dirs() -> Result<()> {
        let temp_dir = TempDir::new()?;
        init_git_dir(temp_dir.path(), "plugin-b");
        init_git_dir(temp_dir.path(), "plugin-a");
        fs::create_dir(temp_dir.path().join("manual-plugin"))?;

        let records = discover_tracked(temp_dir.path())?;
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["plugin-a", "plugin-b"]);
        assert!(records.iter().all(|r| r.is_tracked));
        Ok(())
    }

    #[test]
    fn test_discover_manual_finds_plain_dirs() -> Result<()> {
        let temp_dir = TempDir::new()?;
        init_git_dir(temp_dir.path(), "tracked");
        fs::create_dir(temp_dir.path().join("zeta"))?;
        fs::create_dir(temp_dir.path().join("alpha"))?;

        let names = discover_manual(temp_dir.path())?;
        assert_eq!(names, vec!["alpha", "zeta"]);
        Ok(())
    }

    #[test]
    fn test_discovery_ignores_plain_files() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("README.txt"), "not a checkout")?;

        assert!(discover_tracked(temp_dir.path())?.is_empty());
        assert!(discover_manual(temp_dir.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_discovery_empty_root() -> Result<()> {
        let temp_dir = TempDir::new()?;
        assert!(discover_tracked(temp_dir.path())?.is_empty());
        assert!(discover_manual(temp_dir.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_discovery_missing_root_is_an_error() {
        let result = discover_tracked(Path::new("/definitely/not/a/root"));
        assert!(result.is_err());
    }
}
