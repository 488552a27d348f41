//! The persistent install registry: ownership, graveyard, and the
//! in-process/cross-process locking that keeps it consistent (spec §4.5,
//! the "hardest subsystem").

use crate::error::{Result, TrackerError};
use crate::record::{GraveyardEntry, InUseMark, InstallRecord};
use crate::session::Session;
use crate::state::RegistryState;
use dotnet_acquire_paths::StorageLayout;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

/// Installer exit code meaning "already at this version; upgraded in place"
/// (spec §4.5, §6). The Acquisition Worker translates this to success.
pub const OK_UPDATE: i32 = 11188;
/// Installer exit code meaning "requested version already installed, no
/// action taken" (spec §4.5, §6). Also translated to success.
pub const OK_ALREADY_EXISTS: i32 = 11166;

/// Persistent registry of installs and their owners, with cross-process
/// liveness via a named session mutex and a graveyard of pending deletions.
///
/// All registry reads/writes within a process are serialised by `inner`; a
/// short-lived named file lock (`modifier_lock_path`) serialises mutation
/// across processes around each transaction (spec §4.5 "Concurrency").
pub struct InstallTracker {
    state_path: PathBuf,
    modifier_lock_path: PathBuf,
    inner: Mutex<()>,
    in_flight: AsyncMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    session: Session,
}

impl InstallTracker {
    pub fn new(storage_root: impl Into<PathBuf>) -> Result<Self> {
        let storage_root = storage_root.into();
        std::fs::create_dir_all(&storage_root)?;
        let session = Session::start()?;
        Ok(Self {
            state_path: storage_root.join("tracker-state.json"),
            modifier_lock_path: storage_root.join("tracker.lock"),
            inner: Mutex::new(()),
            in_flight: AsyncMutex::new(HashMap::new()),
            session,
        })
    }

    /// Construct an isolated instance for tests, avoiding pollution of the
    /// process-wide singleton (Design Notes §9).
    pub fn new_for_test(storage_root: impl Into<PathBuf>) -> Self {
        Self::new(storage_root).expect("test tracker storage root must be writable")
    }

    /// The shared, process-wide instance (spec §5 "process-wide singletons").
    pub fn global() -> &'static InstallTracker {
        static INSTANCE: OnceLock<InstallTracker> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let root = StorageLayout::default_root().root().to_path_buf();
            InstallTracker::new(root).expect("failed to initialise install tracker")
        })
    }

    pub fn session_id(&self) -> &str {
        self.session.id()
    }

    /// Run `mutate` against the current registry state under the in-process
    /// lock and the cross-process modifier lock, persisting the result only
    /// if `mutate` succeeds.
    fn with_modifier_lock<T>(&self, mutate: impl FnOnce(&mut RegistryState) -> Result<T>) -> Result<T> {
        let _guard = self.inner.lock().unwrap();

        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(&self.modifier_lock_path)?;
        fs4::fs_std::FileExt::lock_exclusive(&file)
            .map_err(|e| TrackerError::LockFailed { reason: e.to_string() })?;

        let mut state = RegistryState::load(&self.state_path)?;
        let result = mutate(&mut state);
        if result.is_ok() {
            state.save(&self.state_path)?;
        }

        let _ = fs4::fs_std::FileExt::unlock(&file);
        result
    }

    /// Creates the record if absent, otherwise adds `owner` to its owners.
    /// Adding an already-present owner is a no-op. `path` must already hold a
    /// validated `dotnet` executable.
    pub fn track_install(&self, install_id: &str, path: &Path, owner: Option<&str>) -> Result<()> {
        validate_dotnet_path(path)?;
        self.with_modifier_lock(|state| {
            match state.installed.iter_mut().find(|r| r.install_id == install_id) {
                Some(record) => record.add_owner(owner),
                None => {
                    let mut record = InstallRecord::new(install_id);
                    record.add_owner(owner);
                    state.installed.push(record);
                }
            }
            debug!(install_id, owner = ?owner, "install tracked");
            Ok(())
        })
    }

    /// Removes `owner` from the record's owners. If owners becomes empty,
    /// deletes the record and removes the on-disk directory when no live
    /// session depends on it; otherwise moves it to the graveyard.
    pub fn untrack_install(&self, install_id: &str, owner: Option<&str>, path: &Path) -> Result<()> {
        self.with_modifier_lock(|state| {
            let Some(idx) = state.installed.iter().position(|r| r.install_id == install_id) else {
                return Ok(());
            };
            state.installed[idx].remove_owner(owner);
            if !state.installed[idx].is_empty() {
                return Ok(());
            }
            state.installed.remove(idx);

            if install_has_no_live_dependents_locked(&state.in_use, path) {
                if path.exists() {
                    std::fs::remove_dir_all(path)?;
                }
                info!(install_id, path = %path.display(), "install removed from disk");
            } else {
                state.graveyard.push(GraveyardEntry {
                    install_id: install_id.to_string(),
                    path: path.to_path_buf(),
                });
                warn!(install_id, "install has live dependents; moved to graveyard");
            }
            Ok(())
        })
    }

    /// Records that this process's session currently depends on `exe_path`
    /// (spec §4.5 `markInstallInUse`).
    pub fn mark_install_in_use(&self, exe_path: &Path) -> Result<()> {
        let session_id = self.session.id().to_string();
        self.with_modifier_lock(|state| {
            let already_marked = state
                .in_use
                .iter()
                .any(|mark| mark.session_id == session_id && mark.path == exe_path);
            if !already_marked {
                state.in_use.push(InUseMark {
                    session_id,
                    path: exe_path.to_path_buf(),
                });
            }
            Ok(())
        })
    }

    /// Whether no live session still marks `exe_path` in use.
    pub fn install_has_no_live_dependents(&self, exe_path: &Path) -> Result<bool> {
        let state = RegistryState::load(&self.state_path)?;
        Ok(install_has_no_live_dependents_locked(&state.in_use, exe_path))
    }

    /// Records whose directory falls under `layout`'s root (spec §4.5
    /// `getInstalled`, filtering out installs this library instance doesn't
    /// manage).
    pub fn get_installed(&self, layout: &StorageLayout) -> Result<Vec<InstallRecord>> {
        let state = RegistryState::load(&self.state_path)?;
        Ok(state
            .installed
            .into_iter()
            .filter(|record| layout.owns(&layout.root().join(&record.install_id)))
            .collect())
    }

    /// For each graveyard entry with no live dependents, deletes its
    /// directory and forgets the entry; entries still in use are kept.
    /// Returns the number drained.
    pub fn drain_graveyard(&self) -> Result<usize> {
        self.with_modifier_lock(|state| {
            let in_use = state.in_use.clone();
            let before = state.graveyard.len();
            state.graveyard.retain(|entry| {
                let drainable = install_has_no_live_dependents_locked(&in_use, &entry.path);
                if drainable {
                    if entry.path.exists() {
                        if let Err(err) = std::fs::remove_dir_all(&entry.path) {
                            warn!(install_id = %entry.install_id, %err, "failed to remove graveyard entry");
                            return true;
                        }
                    }
                    debug!(install_id = %entry.install_id, "graveyard entry drained");
                }
                !drainable
            });
            Ok(before - state.graveyard.len())
        })
    }

    /// Ensures only one in-flight computation per `install_id` runs at a
    /// time: in-process via a per-id mutex, cross-process via the modifier
    /// lock. Late callers block on the lock and then run `f` themselves — by
    /// design `f` should re-check the tracker first (double-checked
    /// locking), so a late caller naturally observes the winner's result
    /// instead of repeating the install (spec §4.5 `acquireOnce`).
    pub async fn acquire_once<F, Fut, T>(&self, install_id: &str, f: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let per_install_lock = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight
                .entry(install_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        let _in_process_guard = per_install_lock.lock().await;

        let lock_path = self.modifier_lock_path.clone();
        let file = tokio::task::spawn_blocking(move || -> std::io::Result<std::fs::File> {
            let file = std::fs::OpenOptions::new().create(true).write(true).open(&lock_path)?;
            fs4::fs_std::FileExt::lock_exclusive(&file)?;
            Ok(file)
        })
        .await
        .map_err(|e| TrackerError::LockFailed { reason: e.to_string() })?
        .map_err(TrackerError::Io)?;

        let result = f().await;

        let _ = tokio::task::spawn_blocking(move || fs4::fs_std::FileExt::unlock(&file)).await;

        result
    }
}

fn install_has_no_live_dependents_locked(marks: &[InUseMark], exe_path: &Path) -> bool {
    marks
        .iter()
        .filter(|mark| mark.path == exe_path)
        .all(|mark| !Session::is_session_alive(&mark.session_id))
}

fn validate_dotnet_path(path: &Path) -> Result<()> {
    let is_direct_host = path.is_file()
        && matches!(path.file_name().and_then(|n| n.to_str()), Some("dotnet") | Some("dotnet.exe"));
    if is_direct_host || path.join("dotnet").exists() || path.join("dotnet.exe").exists() {
        return Ok(());
    }
    Err(TrackerError::InvalidInstallPath { path: path.to_path_buf() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotnet_acquire_paths::StorageLayout;

    fn make_dotnet_dir(dir: &Path) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join("dotnet"), b"#!/bin/sh\n").unwrap();
    }

    #[test]
    fn track_then_untrack_removes_empty_record() {
        let root = tempfile::tempdir().unwrap();
        let tracker = InstallTracker::new_for_test(root.path().join("store"));
        let install_dir = root.path().join("store/7.0.100~sdk~x64~local");
        make_dotnet_dir(&install_dir);

        tracker.track_install("7.0.100~sdk~x64~local", &install_dir, Some("ext-a")).unwrap();
        tracker.untrack_install("7.0.100~sdk~x64~local", Some("ext-a"), &install_dir).unwrap();

        let layout = StorageLayout::new(root.path().join("store"));
        assert!(tracker.get_installed(&layout).unwrap().is_empty());
        assert!(!install_dir.exists());
    }

    #[test]
    fn two_owners_share_and_partial_untrack_keeps_directory() {
        let root = tempfile::tempdir().unwrap();
        let tracker = InstallTracker::new_for_test(root.path().join("store"));
        let install_dir = root.path().join("store/7.0.100~sdk~x64~local");
        make_dotnet_dir(&install_dir);

        tracker.track_install("7.0.100~sdk~x64~local", &install_dir, Some("ext-a")).unwrap();
        tracker.track_install("7.0.100~sdk~x64~local", &install_dir, Some("ext-b")).unwrap();
        tracker.untrack_install("7.0.100~sdk~x64~local", Some("ext-a"), &install_dir).unwrap();

        let layout = StorageLayout::new(root.path().join("store"));
        let installed = tracker.get_installed(&layout).unwrap();
        assert_eq!(installed.len(), 1);
        assert_eq!(installed[0].owners, vec![Some("ext-b".to_string())]);
        assert!(install_dir.exists());
    }

    #[test]
    fn track_install_rejects_invalid_path() {
        let root = tempfile::tempdir().unwrap();
        let tracker = InstallTracker::new_for_test(root.path().join("store"));
        let empty_dir = root.path().join("store/empty");
        std::fs::create_dir_all(&empty_dir).unwrap();
        let err = tracker.track_install("x", &empty_dir, Some("ext-a")).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidInstallPath { .. }));
    }

    #[test]
    fn untrack_moves_busy_install_to_graveyard() {
        let root = tempfile::tempdir().unwrap();
        let tracker = InstallTracker::new_for_test(root.path().join("store"));
        let install_dir = root.path().join("store/7.0.100~sdk~x64~local");
        make_dotnet_dir(&install_dir);

        tracker.track_install("7.0.100~sdk~x64~local", &install_dir, Some("ext-a")).unwrap();
        tracker.mark_install_in_use(&install_dir).unwrap();
        tracker.untrack_install("7.0.100~sdk~x64~local", Some("ext-a"), &install_dir).unwrap();

        assert!(install_dir.exists());
        assert!(!tracker.install_has_no_live_dependents(&install_dir).unwrap());
    }

    #[tokio::test]
    async fn acquire_once_serialises_same_install_id() {
        let root = tempfile::tempdir().unwrap();
        let tracker = InstallTracker::new_for_test(root.path().join("store"));
        let counter = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let c1 = counter.clone();
        let a = tracker.acquire_once("same-id", || async move {
            c1.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok::<_, TrackerError>(())
        });
        let c2 = counter.clone();
        let b = tracker.acquire_once("same-id", || async move {
            c2.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok::<_, TrackerError>(())
        });

        let (ra, rb) = tokio::join!(a, b);
        ra.unwrap();
        rb.unwrap();
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
