//! The Acquisition Worker: the front door tying every subsystem together
//! (spec §4.6). Resolves a request to a canonical install, dedupes
//! concurrent acquisitions, invokes the right installer, validates the
//! result, and records ownership.

use crate::channel::fetch_channel_index;
use crate::config::AcquisitionConfig;
use crate::error::{AcquireError, Result};
use crate::request::{AcquireRequest, AcquireResult};
use crate::resolve::normalise_version;
use dotnet_acquire_cache::InMemoryCache;
use dotnet_acquire_exec::CommandExecutor;
use dotnet_acquire_fetch::WebFetcher;
use dotnet_acquire_installer::{GlobalInstaller, LocalInstaller};
use dotnet_acquire_paths::{InstallIdentity, InstallMode, InstallScope, PathFinder, StorageLayout};
use dotnet_acquire_tracker::{InstallTracker, TrackerError};
use dotnet_acquire_version::{compare, is_compatible, parse, CompatibilityPolicy, Version};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub struct AcquisitionWorker {
    config: AcquisitionConfig,
    fetcher: &'static WebFetcher,
    executor: Arc<CommandExecutor>,
    tracker: InstallTracker,
    layout: StorageLayout,
}

impl AcquisitionWorker {
    pub fn new(config: AcquisitionConfig) -> Result<Self> {
        let layout = config.storage_layout();
        layout.ensure_dirs()?;
        let tracker = InstallTracker::new(config.storage_root.clone())?;
        Ok(Self {
            config,
            fetcher: WebFetcher::global(),
            executor: Arc::new(CommandExecutor::new()),
            tracker,
            layout,
        })
    }

    /// Construct an isolated instance rooted at `storage_root`, avoiding any
    /// process-wide singleton (Design Notes §9).
    pub fn new_for_test(storage_root: impl Into<PathBuf>) -> Self {
        let mut config = AcquisitionConfig::default();
        config.storage_root = storage_root.into();
        let layout = config.storage_layout();
        layout.ensure_dirs().expect("test storage root must be writable");
        Self {
            config,
            fetcher: WebFetcher::global(),
            executor: Arc::new(CommandExecutor::new()),
            tracker: InstallTracker::new_for_test(layout.root()),
            layout,
        }
    }

    pub fn session_id(&self) -> &str {
        self.tracker.session_id()
    }

    /// `acquire(request) → {path}` (spec §4.6).
    pub async fn acquire(&self, request: AcquireRequest) -> Result<AcquireResult> {
        let version = normalise_version(&request.version, request.mode, &self.config, self.fetcher, request.reject_previews).await?;
        let architecture = request.architecture.clone().unwrap_or_else(default_architecture);
        let identity = InstallIdentity::new(version.clone(), request.mode, architecture.clone(), request.scope);
        let install_id = identity.install_id();
        let policy = request.policy;

        if let Some(existing) = self.try_existing(&identity, &version, policy, request.requesting_extension_id.as_deref()).await? {
            return Ok(existing);
        }

        if request.cancellation.is_cancelled() {
            return Err(AcquireError::Cancelled { install_id });
        }

        let install_dir = self.layout.install_dir(&identity);
        let captured_err: std::cell::RefCell<Option<AcquireError>> = std::cell::RefCell::new(None);

        // The closure runs under `acquire_once`'s per-install lock (in-process
        // and cross-process). A late caller re-checks the tracker here —
        // double-checked locking (spec §4.5 `acquireOnce`) — so it observes
        // the winner's completed install instead of running the installer a
        // second time (spec §8 property 2 "single-flight").
        let tracker_result = self
            .tracker
            .acquire_once(&install_id, || async {
                if let Ok(Some((existing_id, existing_dir, _))) = self.find_existing_install(&identity, &version, policy).await {
                    return Ok((existing_id, existing_dir));
                }

                match self.perform_install(&identity, &architecture, &install_dir).await {
                    Ok(produced_dir) => Ok((install_id.clone(), produced_dir)),
                    Err(err) => {
                        cleanup_failed_install(&install_dir);
                        *captured_err.borrow_mut() = Some(err);
                        Err(TrackerError::LockFailed { reason: "install failed".into() })
                    }
                }
            })
            .await;

        let (result_install_id, produced_dir) = match tracker_result {
            Ok(result) => result,
            Err(tracker_err) => {
                return Err(captured_err.into_inner().unwrap_or_else(|| tracker_err.into()));
            }
        };

        let path_finder = PathFinder::new(&self.executor);
        let candidate = dotnet_exe_path(&produced_dir);
        let validated = path_finder.get_true_path(&[candidate], Some(architecture.as_str())).await.ok_or_else(|| AcquireError::InstallValidationFailed {
            install_id: result_install_id.clone(),
            reason: "produced dotnet host failed path or architecture validation".into(),
        })?;

        self.tracker.track_install(&result_install_id, &produced_dir, request.requesting_extension_id.as_deref())?;
        info!(install_id = %result_install_id, path = %validated.display(), "acquisition completed");

        Ok(AcquireResult { path: validated, install_id: result_install_id })
    }

    /// Step 2 of `acquire`: is there already a compatible, validated install?
    /// Tracks ownership when one is found.
    async fn try_existing(&self, identity: &InstallIdentity, requested: &Version, policy: CompatibilityPolicy, owner: Option<&str>) -> Result<Option<AcquireResult>> {
        let Some((install_id, install_dir, validated)) = self.find_existing_install(identity, requested, policy).await? else {
            return Ok(None);
        };
        self.tracker.track_install(&install_id, &install_dir, owner)?;
        Ok(Some(AcquireResult { path: validated, install_id }))
    }

    /// Searches the tracker for the best already-installed, still-valid
    /// install compatible with `requested` under `policy`, without recording
    /// any ownership. Used both as `acquire`'s fast pre-lock check and,
    /// re-run inside `acquire_once`'s closure, as the double-checked-locking
    /// re-check a late winner needs in order to skip a redundant install.
    async fn find_existing_install(&self, identity: &InstallIdentity, requested: &Version, policy: CompatibilityPolicy) -> Result<Option<(String, PathBuf, PathBuf)>> {
        let records = self.tracker.get_installed(&self.layout)?;
        let mut best: Option<InstallIdentity> = None;

        for record in &records {
            let Some(candidate_identity) = InstallIdentity::parse(&record.install_id) else { continue };
            if candidate_identity.mode != identity.mode || candidate_identity.architecture != identity.architecture || candidate_identity.scope != identity.scope {
                continue;
            }
            if !is_compatible(&candidate_identity.version, requested, policy) {
                continue;
            }
            let is_better = best.as_ref().map(|b| compare(&candidate_identity.version, &b.version) == Ordering::Greater).unwrap_or(true);
            if is_better {
                best = Some(candidate_identity);
            }
        }

        let Some(identity_match) = best else { return Ok(None) };
        let install_dir = self.layout.install_dir(&identity_match);
        let path_finder = PathFinder::new(&self.executor);
        let Some(validated) = path_finder.get_true_path(&[dotnet_exe_path(&install_dir)], Some(identity.architecture.as_str())).await else {
            return Ok(None);
        };

        Ok(Some((identity_match.install_id(), install_dir, validated)))
    }

    async fn perform_install(&self, identity: &InstallIdentity, architecture: &str, install_dir: &Path) -> Result<PathBuf> {
        match identity.scope {
            InstallScope::Local => {
                let installer = LocalInstaller::new(self.fetcher, &self.executor, &self.layout);
                installer.install(identity, architecture).await?;
                Ok(install_dir.to_path_buf())
            }
            InstallScope::Global if cfg!(target_os = "linux") => self.run_distro_install(&identity.version, identity.mode).await,
            InstallScope::Global => self.run_global_install(&identity.version, identity.mode, architecture).await,
        }
    }

    async fn run_distro_install(&self, version: &Version, mode: InstallMode) -> Result<PathBuf> {
        let distro_mode = to_distro_mode(mode);
        let distro_pair = dotnet_acquire_distro::detect(InMemoryCache::global())?;
        let provider = dotnet_acquire_distro::select_provider(&distro_pair, self.executor.clone())?;
        dotnet_acquire_distro::validate_and_install_sdk(provider.as_ref(), version, distro_mode).await?;
        let dir = provider.get_installed_global_dotnet_path(distro_mode).await?.unwrap_or_else(|| provider.get_expected_distro_feed_install_dir());
        Ok(dir)
    }

    async fn run_global_install(&self, version: &Version, mode: InstallMode, architecture: &str) -> Result<PathBuf> {
        let (major, minor) = version.get_major_minor();
        let channel = format!("{major}.{}", minor.unwrap_or(0));
        let index_url = format!("{}/{channel}/releases.json", self.config.release_metadata_base_url);
        let installer = GlobalInstaller::new(self.fetcher, &self.executor);
        installer.install(&index_url, &version.to_string(), mode, architecture).await?;
        Ok(default_global_install_dir())
    }

    /// `findPath({mode, versionSpec, policy, rejectPreviews?, disableLocalLookup?}) → {path, version}?`
    /// (spec §6). Never installs; only looks at what is already present.
    pub async fn find_path(&self, mode: InstallMode, version_spec: &str, policy: CompatibilityPolicy, disable_local_lookup: bool) -> Result<Option<AcquireResult>> {
        let requested = parse(version_spec)?;
        let path_finder = PathFinder::new(&self.executor);
        let mut best: Option<(Version, PathBuf, String)> = None;

        if !disable_local_lookup {
            let records = self.tracker.get_installed(&self.layout)?;
            for record in records {
                let Some(identity) = InstallIdentity::parse(&record.install_id) else { continue };
                if identity.mode != mode || !is_compatible(&identity.version, &requested, policy) {
                    continue;
                }
                let is_better = best.as_ref().map(|(v, _, _)| compare(&identity.version, v) == Ordering::Greater).unwrap_or(true);
                if is_better {
                    let dir = self.layout.install_dir(&identity);
                    best = Some((identity.version.clone(), dotnet_exe_path(&dir), record.install_id.clone()));
                }
            }
        }

        if let Ok(on_path) = which::which(dotnet_exe_name()) {
            let versions: Vec<String> = match mode {
                InstallMode::Sdk => path_finder.get_sdks(&on_path, None).await.into_iter().map(|e| e.version).collect(),
                InstallMode::Runtime | InstallMode::AspNetCoreRuntime => path_finder.get_runtimes(&on_path, None).await.into_iter().map(|e| e.version).collect(),
            };
            for raw in versions {
                let Ok(parsed) = parse(&raw) else { continue };
                if !is_compatible(&parsed, &requested, policy) {
                    continue;
                }
                let is_better = best.as_ref().map(|(v, _, _)| compare(&parsed, v) == Ordering::Greater).unwrap_or(true);
                if is_better {
                    best = Some((parsed, on_path.clone(), format!("path:{raw}")));
                }
            }
        }

        let Some((_, candidate_path, install_id)) = best else { return Ok(None) };
        Ok(path_finder.get_true_path(&[candidate_path], None).await.map(|path| AcquireResult { path, install_id }))
    }

    /// `uninstallAll() → {removed: int}` (spec §6), scoped to the calling
    /// extension id's ownership (SPEC_FULL §B).
    pub async fn uninstall_all(&self, requesting_extension_id: Option<&str>) -> Result<usize> {
        let records = self.tracker.get_installed(&self.layout)?;
        let mut removed = 0;
        for record in records {
            if !record.owners.iter().any(|o| o.as_deref() == requesting_extension_id) {
                continue;
            }
            let Some(identity) = InstallIdentity::parse(&record.install_id) else { continue };
            let dir = self.layout.install_dir(&identity);
            match self.tracker.untrack_install(&record.install_id, requesting_extension_id, &dir) {
                Ok(()) => removed += 1,
                Err(err) => warn!(install_id = %record.install_id, %err, "failed to untrack during uninstall_all"),
            }
        }
        let _ = self.tracker.drain_graveyard();
        Ok(removed)
    }

    /// `listInstalled() → InstallRecord[]` (spec §6).
    pub fn list_installed(&self) -> Result<Vec<dotnet_acquire_tracker::InstallRecord>> {
        Ok(self.tracker.get_installed(&self.layout)?)
    }
}

fn to_distro_mode(mode: InstallMode) -> dotnet_acquire_distro::DotnetMode {
    match mode {
        InstallMode::Sdk => dotnet_acquire_distro::DotnetMode::Sdk,
        InstallMode::Runtime => dotnet_acquire_distro::DotnetMode::Runtime,
        InstallMode::AspNetCoreRuntime => dotnet_acquire_distro::DotnetMode::AspNetCoreRuntime,
    }
}

fn dotnet_exe_name() -> &'static str {
    if cfg!(windows) {
        "dotnet.exe"
    } else {
        "dotnet"
    }
}

fn dotnet_exe_path(dir: &Path) -> PathBuf {
    dir.join(dotnet_exe_name())
}

fn default_architecture() -> String {
    match std::env::consts::ARCH {
        "x86_64" => "x64".to_string(),
        "x86" => "x86".to_string(),
        "aarch64" => "arm64".to_string(),
        other => other.to_string(),
    }
}

fn default_global_install_dir() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(std::env::var("ProgramFiles").unwrap_or_else(|_| "C:\\Program Files".into())).join("dotnet")
    } else {
        PathBuf::from("/usr/local/share/dotnet")
    }
}

fn cleanup_failed_install(dir: &Path) {
    if dir.exists() {
        if let Err(err) = std::fs::remove_dir_all(dir) {
            warn!(dir = %dir.display(), %err, "failed to clean up partial install directory");
        }
    }
}

#[allow(unused)]
fn silence_unused_fetch_helper() {
    // fetch_channel_index is exercised via resolve::normalise_version and
    // GlobalInstaller internally; kept importable here for callers that
    // need the raw channel index (e.g. a future `listAvailable` surface).
    let _ = fetch_channel_index;
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotnet_acquire_version::parse as parse_version;
    use tempfile::TempDir;

    fn make_dotnet_dir(dir: &Path) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dotnet_exe_path(dir), b"#!/bin/sh\nexit 0\n").unwrap();
    }

    #[tokio::test]
    async fn acquire_reuses_compatible_existing_install() {
        let tmp = TempDir::new().unwrap();
        let worker = AcquisitionWorker::new_for_test(tmp.path().join("store"));

        let identity = InstallIdentity::new(parse_version("8.0.100").unwrap(), InstallMode::Sdk, default_architecture(), InstallScope::Local);
        let install_dir = worker.layout.install_dir(&identity);
        make_dotnet_dir(&install_dir);
        worker.tracker.track_install(&identity.install_id(), &install_dir, Some("ext-a")).unwrap();

        let request = AcquireRequest::new("8.0.100", InstallMode::Sdk).with_extension_id("ext-b").with_policy(CompatibilityPolicy::Disable);
        let result = worker.acquire(request).await.unwrap();
        assert_eq!(result.install_id, identity.install_id());

        let installed = worker.list_installed().unwrap();
        let record = installed.iter().find(|r| r.install_id == identity.install_id()).unwrap();
        assert!(record.owners.contains(&Some("ext-a".to_string())));
        assert!(record.owners.contains(&Some("ext-b".to_string())));
    }

    #[tokio::test]
    async fn concurrent_acquire_for_existing_install_shares_single_record() {
        let tmp = TempDir::new().unwrap();
        let worker = AcquisitionWorker::new_for_test(tmp.path().join("store"));

        let identity = InstallIdentity::new(parse_version("8.0.100").unwrap(), InstallMode::Sdk, default_architecture(), InstallScope::Local);
        let install_dir = worker.layout.install_dir(&identity);
        make_dotnet_dir(&install_dir);
        worker.tracker.track_install(&identity.install_id(), &install_dir, Some("ext-a")).unwrap();

        let request_b = AcquireRequest::new("8.0.100", InstallMode::Sdk).with_extension_id("ext-b").with_policy(CompatibilityPolicy::Disable);
        let request_c = AcquireRequest::new("8.0.100", InstallMode::Sdk).with_extension_id("ext-c").with_policy(CompatibilityPolicy::Disable);

        let (result_b, result_c) = tokio::join!(worker.acquire(request_b), worker.acquire(request_c));
        let result_b = result_b.unwrap();
        let result_c = result_c.unwrap();
        assert_eq!(result_b.install_id, identity.install_id());
        assert_eq!(result_c.install_id, identity.install_id());

        let installed = worker.list_installed().unwrap();
        assert_eq!(installed.len(), 1);
        let owners = &installed[0].owners;
        assert!(owners.contains(&Some("ext-a".to_string())));
        assert!(owners.contains(&Some("ext-b".to_string())));
        assert!(owners.contains(&Some("ext-c".to_string())));
    }

    #[tokio::test]
    async fn uninstall_all_only_removes_calling_owner() {
        let tmp = TempDir::new().unwrap();
        let worker = AcquisitionWorker::new_for_test(tmp.path().join("store"));

        let identity = InstallIdentity::new(parse_version("8.0.100").unwrap(), InstallMode::Sdk, default_architecture(), InstallScope::Local);
        let install_dir = worker.layout.install_dir(&identity);
        make_dotnet_dir(&install_dir);
        worker.tracker.track_install(&identity.install_id(), &install_dir, Some("ext-a")).unwrap();
        worker.tracker.track_install(&identity.install_id(), &install_dir, Some("ext-b")).unwrap();

        let removed = worker.uninstall_all(Some("ext-a")).await.unwrap();
        assert_eq!(removed, 1);
        assert!(install_dir.exists());
        let installed = worker.list_installed().unwrap();
        assert_eq!(installed[0].owners, vec![Some("ext-b".to_string())]);
    }

    #[tokio::test]
    async fn find_path_returns_none_when_nothing_matches() {
        let tmp = TempDir::new().unwrap();
        let worker = AcquisitionWorker::new_for_test(tmp.path().join("store"));
        let result = worker.find_path(InstallMode::Sdk, "99.0", CompatibilityPolicy::Major, true).await.unwrap();
        assert!(result.is_none());
    }
}
