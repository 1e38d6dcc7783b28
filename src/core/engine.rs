//! Synchronization orchestrator.
//!
//! [`SyncEngine`] is the concurrency-control shell around discovery,
//! inspection and the mutating operators: a single-flight guard with
//! cancel-and-restart for refresh-all, per-checkout activity guards for
//! mutating operators, and a thread-safe map of checkout name to latest
//! known record that callers read without blocking operators.
//!
//! # Public API
//! - [`SyncEngine`]: engine handle, constructed once by the host
//! - [`RefreshOutcome`]: result of a refresh-all request
//!
//! # Concurrency
//! Operators are blocking and safe to call from any thread. No lock is held
//! across repository I/O; the record map lock is taken only to publish a
//! finished record or take a snapshot. A second mutating request for a busy
//! checkout is a silent no-op, never queued.

use crate::core::{
    clone_url,
    credentials::CredentialResolver,
    discovery,
    error::{Result, SyncError},
    record::{Activity, CheckoutRecord},
    repo::{CheckoutRepo, Inspection},
    sink::LogSink,
};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// How long a restart request waits for the superseded refresh to observe
/// cancellation before giving up.
const RESTART_WAIT: Duration = Duration::from_secs(10);

/// Result of a refresh-all request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Every tracked checkout was processed.
    Completed { completed: usize, total: usize },
    /// A restart request cancelled the run between checkouts.
    Cancelled { completed: usize, total: usize },
    /// A refresh was already running and the caller declined to restart it.
    Declined,
}

pub struct SyncEngine {
    root: PathBuf,
    sink: Arc<dyn LogSink>,
    resolver: CredentialResolver,
    records: Mutex<BTreeMap<String, CheckoutRecord>>,
    manual: Vec<String>,
    activity: Mutex<HashMap<String, Activity>>,
    // Cancel flag of the in-flight refresh, if any
    refresh_slot: Mutex<Option<Arc<AtomicBool>>>,
    refresh_done: Condvar,
}

/// Restores a checkout to `Idle` on every exit path of an operator.
struct ActivityGuard<'a> {
    engine: &'a SyncEngine,
    name: String,
}

impl Drop for ActivityGuard<'_> {
    fn drop(&mut self) {
        self.engine
            .activity
            .lock()
            .unwrap()
            .remove(&self.name);
    }
}

/// Clears the refresh slot and wakes restart waiters on every exit path of a
/// refresh run, including a panic in a caller-supplied callback.
struct RefreshSlotGuard<'a> {
    engine: &'a SyncEngine,
}

impl Drop for RefreshSlotGuard<'_> {
    fn drop(&mut self) {
        *self.engine.refresh_slot.lock().unwrap() = None;
        self.engine.refresh_done.notify_all();
    }
}

impl SyncEngine {
    /// Construct the engine for `root`, discovering checkouts immediately.
    /// Manual (untracked) directories are reported once as warnings.
    pub fn new(root: impl Into<PathBuf>, sink: Arc<dyn LogSink>) -> Result<Self> {
        Self::with_resolver(root, sink, CredentialResolver::default())
    }

    /// Construct with a custom credential resolver (tests substitute a
    /// scripted or missing helper here).
    pub fn with_resolver(
        root: impl Into<PathBuf>,
        sink: Arc<dyn LogSink>,
        resolver: CredentialResolver,
    ) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SyncError::directory_not_found(&root));
        }

        let tracked = discovery::discover_tracked(&root)?;
        let manual = discovery::discover_manual(&root)?;
        for name in &manual {
            sink.log_warning(&format!(
                "'{name}' is not under version control and will not be synchronized"
            ));
        }

        let records = tracked
            .into_iter()
            .map(|record| (record.name.clone(), record))
            .collect();

        Ok(Self {
            root,
            sink,
            resolver,
            records: Mutex::new(records),
            manual,
            activity: Mutex::new(HashMap::new()),
            refresh_slot: Mutex::new(None),
            refresh_done: Condvar::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Snapshot of all records, ordered by name. Never blocks on operators.
    pub fn list_checkouts(&self) -> Vec<CheckoutRecord> {
        self.records.lock().unwrap().values().cloned().collect()
    }

    /// Names of untracked directories found at construction time.
    pub fn list_manual_checkouts(&self) -> Vec<String> {
        self.manual.clone()
    }

    /// Latest known record for one checkout.
    pub fn checkout(&self, name: &str) -> Option<CheckoutRecord> {
        self.records.lock().unwrap().get(name).cloned()
    }

    /// Refresh every tracked checkout: fetch, inspect, publish.
    ///
    /// Single-flight with cancel-and-restart: when a refresh is already
    /// running, `confirm_restart` is consulted synchronously. Declining
    /// returns [`RefreshOutcome::Declined`] without touching the in-flight
    /// run; accepting signals cancellation and waits a bounded time for the
    /// run to observe it ([`SyncError::RefreshBusy`] on timeout).
    ///
    /// Per-checkout failures are logged and skipped; `on_progress` is called
    /// with `(completed, total)` after every checkout regardless of outcome.
    pub fn refresh_all<C, P>(&self, confirm_restart: C, mut on_progress: P) -> Result<RefreshOutcome>
    where
        C: FnOnce() -> bool,
        P: FnMut(usize, usize),
    {
        let cancel_flag = {
            let mut slot = self.refresh_slot.lock().unwrap();
            if slot.is_some() {
                if !confirm_restart() {
                    return Ok(RefreshOutcome::Declined);
                }
                if let Some(active) = slot.as_ref() {
                    active.store(true, Ordering::SeqCst);
                }
                let (guard, timeout) = self
                    .refresh_done
                    .wait_timeout_while(slot, RESTART_WAIT, |s| s.is_some())
                    .unwrap();
                slot = guard;
                if timeout.timed_out() && slot.is_some() {
                    return Err(SyncError::RefreshBusy);
                }
            }
            let flag = Arc::new(AtomicBool::new(false));
            *slot = Some(flag.clone());
            flag
        };
        let _slot_guard = RefreshSlotGuard { engine: self };

        let names: Vec<String> = {
            let records = self.records.lock().unwrap();
            records
                .values()
                .filter(|r| r.is_tracked)
                .map(|r| r.name.clone())
                .collect()
        };
        let total = names.len();
        self.sink
            .log_info(&format!("Refreshing {total} tracked checkouts"));

        let mut completed = 0;
        let mut cancelled = false;
        for name in names {
            // Cooperative cancellation, checked between checkouts; a network
            // call already in flight is never aborted
            if cancel_flag.load(Ordering::SeqCst) {
                cancelled = true;
                break;
            }
            if let Err(e) = self.refresh_one(&name) {
                self.sink
                    .log_error(&format!("Refresh of '{name}' failed: {e}"));
            }
            completed += 1;
            on_progress(completed, total);
        }

        if cancelled {
            self.sink.log_info(&format!(
                "Refresh cancelled after {completed} of {total} checkouts"
            ));
            Ok(RefreshOutcome::Cancelled { completed, total })
        } else {
            Ok(RefreshOutcome::Completed { completed, total })
        }
    }

    /// Inspect every tracked checkout without touching the network, for
    /// callers that want local state before any refresh has run. Failures are
    /// logged and skipped, like refresh-all.
    pub fn inspect_all(&self) {
        let names: Vec<String> = {
            let records = self.records.lock().unwrap();
            records
                .values()
                .filter(|r| r.is_tracked)
                .map(|r| r.name.clone())
                .collect()
        };
        for name in names {
            let record = match self.checkout(&name) {
                Some(record) => record,
                None => continue,
            };
            let result = CheckoutRepo::open(&record.path).and_then(|repo| repo.inspect());
            match result {
                Ok(inspection) => self.publish(&name, inspection, None, None),
                Err(e) => self
                    .sink
                    .log_warning(&format!("Inspection of '{name}' failed: {e}")),
            }
        }
    }

    /// Fetch + inspect + publish for one checkout. A fetch failure degrades
    /// to a status-only refresh so stale but valid state is still published.
    fn refresh_one(&self, name: &str) -> Result<()> {
        let record = match self.checkout(name) {
            Some(record) => record,
            None => return Ok(()), // deleted mid-refresh
        };

        let repo = CheckoutRepo::open(&record.path)?;
        if let Err(e) = repo.fetch(&self.resolver, name) {
            self.sink
                .log_warning(&format!("Fetch for '{name}' failed: {e}"));
        }
        let inspection = repo.inspect()?;
        self.publish(name, inspection, None, None);
        Ok(())
    }

    /// Fast-forward one checkout to its upstream tip.
    ///
    /// Unknown names are a benign race with delete and a silent no-op, as is
    /// a checkout that is already busy with a mutating operator.
    pub fn update(&self, name: &str) -> Result<()> {
        if self.checkout(name).is_none() {
            return Ok(());
        }
        let _guard = match self.try_begin(name, Activity::Updating) {
            Some(guard) => guard,
            None => return Ok(()),
        };

        match self.update_inner(name) {
            Ok(message) => {
                self.sink.log_success(&format!("'{name}': {message}"));
                Ok(())
            }
            Err(e) => {
                self.sink.log_error(&format!("Update of '{name}' failed: {e}"));
                Err(e)
            }
        }
    }

    fn update_inner(&self, name: &str) -> Result<String> {
        let record = match self.checkout(name) {
            Some(record) => record,
            None => return Ok("checkout vanished".to_string()),
        };
        let repo = CheckoutRepo::open(&record.path)?;
        repo.fetch(&self.resolver, name)?;
        let outcome = repo.fast_forward()?;
        let message = outcome.message();
        let inspection = repo.inspect()?;
        self.publish(name, inspection, Some(message.clone()), None);
        Ok(message)
    }

    /// Hard-reset one checkout to the parent of HEAD.
    pub fn revert(&self, name: &str) -> Result<()> {
        if self.checkout(name).is_none() {
            return Ok(());
        }
        let _guard = match self.try_begin(name, Activity::Reverting) {
            Some(guard) => guard,
            None => return Ok(()),
        };

        match self.revert_inner(name) {
            Ok(message) => {
                self.sink.log_success(&format!("'{name}': {message}"));
                Ok(())
            }
            Err(e) => {
                self.sink.log_error(&format!("Revert of '{name}' failed: {e}"));
                Err(e)
            }
        }
    }

    fn revert_inner(&self, name: &str) -> Result<String> {
        let record = match self.checkout(name) {
            Some(record) => record,
            None => return Ok("checkout vanished".to_string()),
        };
        let repo = CheckoutRepo::open(&record.path)?;
        let parent = repo.revert_to_parent(name)?;
        let message = format!("Reverted to {parent}");
        let inspection = repo.inspect()?;
        self.publish(name, inspection, Some(message.clone()), None);
        Ok(message)
    }

    /// Switch one checkout to `branch`, snapping to the remote state.
    pub fn switch_branch(&self, name: &str, branch: &str) -> Result<()> {
        if self.checkout(name).is_none() {
            return Ok(());
        }
        let _guard = match self.try_begin(name, Activity::Switching) {
            Some(guard) => guard,
            None => return Ok(()),
        };

        // The selection is visible while the switch is pending
        let previous_selection = {
            let mut records = self.records.lock().unwrap();
            match records.get_mut(name) {
                Some(record) => {
                    std::mem::replace(&mut record.selected_branch, branch.to_string())
                }
                None => return Ok(()),
            }
        };

        match self.switch_inner(name, branch) {
            Ok(message) => {
                self.sink.log_success(&format!("'{name}': {message}"));
                Ok(())
            }
            Err(e) => {
                // A rejected selection must not stick in the record
                {
                    let mut records = self.records.lock().unwrap();
                    if let Some(record) = records.get_mut(name) {
                        if record.selected_branch == branch {
                            record.selected_branch = previous_selection;
                        }
                    }
                }
                self.sink
                    .log_error(&format!("Branch switch of '{name}' failed: {e}"));
                Err(e)
            }
        }
    }

    fn switch_inner(&self, name: &str, branch: &str) -> Result<String> {
        let record = match self.checkout(name) {
            Some(record) => record,
            None => return Ok("checkout vanished".to_string()),
        };
        let repo = CheckoutRepo::open(&record.path)?;
        let remote_name = repo.fetch(&self.resolver, name)?;
        let tip = repo.switch_branch(branch, &remote_name)?;
        let message = format!("Switched to branch '{branch}' at {tip}");
        let inspection = repo.inspect()?;
        self.publish(name, inspection, Some(message.clone()), Some(branch.to_string()));
        Ok(message)
    }

    /// Clone a new checkout into the root. The URL may carry a trailing
    /// `/tree/<branch>` selector. Atomic: on failure no target directory
    /// remains.
    pub fn clone_checkout(&self, url: &str) -> Result<()> {
        match self.clone_inner(url) {
            Ok(name) => {
                self.sink
                    .log_success(&format!("Cloned '{name}' from {url}"));
                Ok(())
            }
            Err(e) => {
                self.sink.log_error(&format!("Clone of {url} failed: {e}"));
                Err(e)
            }
        }
    }

    fn clone_inner(&self, url: &str) -> Result<String> {
        let target = clone_url::parse_clone_url(url)?;
        if self.checkout(&target.name).is_some() {
            return Err(SyncError::target_already_exists(&target.name));
        }

        let path = clone_url::clone_checkout(&self.root, &target, &self.resolver)?;

        // A freshly cloned checkout is inspected immediately so its record is
        // fully populated from the start. The rollback window extends through
        // this inspection: a clone that cannot produce a record (an unborn
        // HEAD on an empty remote, say) leaves no directory behind
        let mut record = CheckoutRecord::discovered(&target.name, path.clone(), true);
        let inspected = CheckoutRepo::open(&path).and_then(|repo| repo.inspect());
        match inspected {
            Ok(inspection) => inspection.apply_to(&mut record),
            Err(e) => {
                if let Err(cleanup) = remove_tree(&path) {
                    log::error!(
                        "Failed to remove unusable clone at {}: {cleanup}",
                        path.display()
                    );
                }
                return Err(e);
            }
        }
        record.last_operation_message = format!("Cloned from {}", target.url);
        record.selected_branch = record.current_branch.clone();

        self.records
            .lock()
            .unwrap()
            .insert(target.name.clone(), record);
        Ok(target.name)
    }

    /// Delete a checkout's directory tree and drop its record.
    ///
    /// Only tracked checkouts with a record are deletable; manual directories
    /// and arbitrary names never resolve to a target. Repository handles are
    /// scoped to each operation, so nothing holds the object files open here;
    /// read-only attributes are cleared first because git writes its object
    /// files read-only.
    pub fn delete(&self, name: &str) -> Result<()> {
        let record = match self.checkout(name) {
            Some(record) => record,
            None => {
                let e = SyncError::directory_not_found(self.root.join(name));
                self.sink.log_error(&format!("Delete of '{name}' failed: {e}"));
                return Err(e);
            }
        };

        if !record.path.is_dir() {
            let e = SyncError::directory_not_found(&record.path);
            self.sink.log_error(&format!("Delete of '{name}' failed: {e}"));
            return Err(e);
        }

        if let Err(e) = remove_tree(&record.path) {
            let e = SyncError::from(e);
            self.sink.log_error(&format!("Delete of '{name}' failed: {e}"));
            return Err(e);
        }

        self.records.lock().unwrap().remove(name);
        self.sink.log_success(&format!("Deleted '{name}'"));
        Ok(())
    }

    /// Claim a checkout for a mutating operator. Returns `None` when another
    /// operator is already active on it; the transition from idle to busy is
    /// a single atomic check-and-set under the activity lock.
    fn try_begin(&self, name: &str, activity: Activity) -> Option<ActivityGuard<'_>> {
        let mut activities = self.activity.lock().unwrap();
        match activities.get(name) {
            Some(Activity::Idle) | None => {
                activities.insert(name.to_string(), activity);
                Some(ActivityGuard {
                    engine: self,
                    name: name.to_string(),
                })
            }
            Some(_) => None,
        }
    }

    /// Replace a record wholesale with a fresh inspection. Readers holding a
    /// prior snapshot are unaffected.
    fn publish(
        &self,
        name: &str,
        inspection: Inspection,
        message: Option<String>,
        selected_branch: Option<String>,
    ) {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.get_mut(name) {
            let mut updated = record.clone();
            inspection.apply_to(&mut updated);
            if let Some(message) = message {
                updated.last_operation_message = message;
            }
            if let Some(branch) = selected_branch {
                updated.selected_branch = branch;
            }
            *record = updated;
        }
    }
}

/// Clear read-only attributes recursively, then remove the tree.
fn remove_tree(path: &Path) -> std::io::Result<()> {
    clear_readonly(path)?;
    fs::remove_dir_all(path)
}

fn clear_readonly(path: &Path) -> std::io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    let mut permissions = metadata.permissions();
    if permissions.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)?;
    }
    if metadata.is_dir() {
        for entry in fs::read_dir(path)? {
            clear_readonly(&entry?.path())?;
        }
    }
    Ok(())
}
