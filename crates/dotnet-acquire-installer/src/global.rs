//! Global Installer (spec §4.9): resolves a fully specified patch from the
//! channel index, downloads the native installer for the current OS/arch,
//! and runs it.

use crate::channel_index::{select_installer_file, ChannelIndex};
use crate::error::{InstallerError, Result};
use dotnet_acquire_exec::{Command, CommandExecutor, ExecuteOptions};
use dotnet_acquire_fetch::{FetchContext, FetchOptions, WebFetcher};
use dotnet_acquire_paths::InstallMode;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

const CHANNEL_INDEX_TTL_MS: u64 = 60 * 60 * 1000;

pub struct GlobalInstaller<'a> {
    fetcher: &'a WebFetcher,
    executor: &'a CommandExecutor,
}

impl<'a> GlobalInstaller<'a> {
    pub fn new(fetcher: &'a WebFetcher, executor: &'a CommandExecutor) -> Self {
        Self { fetcher, executor }
    }

    async fn fetch_channel_index(&self, index_url: &str) -> Result<ChannelIndex> {
        let ctx = FetchContext::default().with_timeout_sec(30);
        let options = FetchOptions::default();
        let body = self.fetcher.get_cached(index_url, &ctx, &options, CHANNEL_INDEX_TTL_MS).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Resolves `requested_version` (possibly band-only, e.g. `8.0.1xx`)
    /// against the channel index at `index_url`, downloads and runs the
    /// matching native installer, and returns the resolved patch version.
    pub async fn install(&self, index_url: &str, requested_version: &str, mode: InstallMode, architecture: &str) -> Result<String> {
        let index = self.fetch_channel_index(index_url).await?;
        let release = index.find_release(requested_version).ok_or_else(|| InstallerError::NoMatchingRelease {
            channel_version: index.channel_version.clone(),
        })?;

        let files = release.files_for_mode(mode).ok_or_else(|| InstallerError::NoMatchingRelease {
            channel_version: index.channel_version.clone(),
        })?;

        let os = current_os();
        let file = select_installer_file(files, os, architecture).ok_or_else(|| InstallerError::NoMatchingRid {
            channel_version: index.channel_version.clone(),
            rid: format!("{os}-{architecture}"),
        })?;

        let temp_path = std::env::temp_dir().join(format!("dotnet-acquire-installer-{}-{}", Uuid::new_v4(), file.name));
        self.fetcher.download(&file.url, &temp_path, &FetchContext::default().with_timeout_sec(120)).await?;

        if !temp_path.exists() {
            return Err(InstallerError::DownloadMissing { path: temp_path });
        }

        let status = self.run_native_installer(&temp_path).await?;
        let _ = tokio::fs::remove_file(&temp_path).await;

        if status == 0 {
            info!(version = %requested_version, "global installer completed");
            let resolved = release.sdk.as_ref().or(release.runtime.as_ref()).map(|f| f.version.clone()).unwrap_or_else(|| release.release_version.clone());
            Ok(resolved)
        } else if is_windows_elevation_conflict(status) {
            Err(InstallerError::ConflictingGlobalWindowsInstall)
        } else {
            Err(InstallerError::NonZeroInstallerExit { installer_url: file.url.clone(), status })
        }
    }

    async fn run_native_installer(&self, installer_path: &PathBuf) -> Result<i32> {
        let cmd = if cfg!(windows) {
            Command::new(installer_path.display().to_string()).args(["/quiet", "/norestart"])
        } else {
            Command::new("installer").args(["-pkg", &installer_path.display().to_string(), "-target", "/"]).under_sudo()
        };
        let result = self.executor.execute(&cmd, &ExecuteOptions::default()).await?;
        Ok(result.status)
    }
}

fn current_os() -> &'static str {
    if cfg!(windows) {
        "win"
    } else if cfg!(target_os = "macos") {
        "osx"
    } else {
        "linux"
    }
}

/// Windows Installer maps a refused elevation prompt to exit code 1602
/// (`ERROR_INSTALL_USEREXIT`); treat it as a conflicting concurrent install
/// rather than a generic failure.
fn is_windows_elevation_conflict(status: i32) -> bool {
    cfg!(windows) && status == 1602
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_os_is_non_empty() {
        assert!(!current_os().is_empty());
    }
}
