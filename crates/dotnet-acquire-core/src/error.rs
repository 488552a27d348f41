//! The public error taxonomy (spec §7): every recoverable condition a
//! caller of [`crate::AcquisitionWorker`] can observe, named the way the
//! lower subsystems name their own conditions rather than re-invented here.

use std::path::PathBuf;

/// Result type alias for the acquisition core's public API.
pub type Result<T> = std::result::Result<T, AcquireError>;

#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    // --- Transport ---
    #[error("request to '{url}' timed out{}", if *.offline { " (host appears offline)" } else { "" })]
    Timeout { url: String, offline: bool },

    #[error("host appears offline")]
    Offline,

    #[error("web request failed: {0}")]
    WebRequestFailed(String),

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("no space left on device while downloading '{url}'")]
    DiskFull { url: String },

    // --- Version / policy ---
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("version {version} is not supported: {reason}")]
    Unsupported { version: String, reason: String },

    #[error("could not resolve '{requested}' to a fully specified version via release metadata")]
    VersionResolutionFailed { requested: String },

    #[error("no installed version of {requested} satisfies the '{policy}' compatibility policy")]
    CompatibilityMismatch { requested: String, policy: String },

    // --- Install ---
    #[error("install script exited with status {status}: {output}")]
    InstallScriptFailed { status: i32, output: String },

    #[error("installer for {installer_url} exited with status {status}")]
    NonZeroInstallerExit { installer_url: String, status: i32 },

    #[error("post-install validation failed for {install_id}: {reason}")]
    InstallValidationFailed { install_id: String, reason: String },

    #[error("a {support} install already exists; installing via the other feed would conflict")]
    ConflictingInstallTypes { support: String },

    #[error("an existing install was found at '{}', outside the expected feed directory", path.display())]
    CustomInstallExists { path: PathBuf },

    #[error("a conflicting global .NET install is already in progress on Windows")]
    ConflictingGlobalWindowsInstall,

    #[error("refusing to run an elevated command under WSL for '{root}'")]
    WslSecurityError { root: String },

    // --- Distro ---
    #[error("could not determine the Linux distribution")]
    DistroUnknown,

    #[error("RHEL 7 is not supported by this installer")]
    RhelUnsupported,

    // --- Tracker / local failure ---
    #[error(transparent)]
    Tracker(#[from] dotnet_acquire_tracker::TrackerError),

    #[error("acquisition of {install_id} was cancelled")]
    Cancelled { install_id: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<dotnet_acquire_fetch::FetchError> for AcquireError {
    fn from(err: dotnet_acquire_fetch::FetchError) -> Self {
        use dotnet_acquire_fetch::FetchError;
        match err {
            FetchError::Timeout { url, offline } => AcquireError::Timeout { url, offline },
            FetchError::Offline => AcquireError::Offline,
            FetchError::WebRequestFailed { url, source } => AcquireError::WebRequestFailed(format!("{url}: {source}")),
            FetchError::DownloadFailed { url, reason } => AcquireError::DownloadFailed(format!("{url}: {reason}")),
            FetchError::DiskFull { url } => AcquireError::DiskFull { url },
            FetchError::Cancelled => AcquireError::Cancelled { install_id: String::new() },
        }
    }
}

impl From<dotnet_acquire_version::VersionError> for AcquireError {
    fn from(err: dotnet_acquire_version::VersionError) -> Self {
        let dotnet_acquire_version::VersionError::InvalidVersion { version, reason } = err;
        AcquireError::InvalidVersion { version, reason }
    }
}

impl From<dotnet_acquire_exec::ExecError> for AcquireError {
    fn from(err: dotnet_acquire_exec::ExecError) -> Self {
        use dotnet_acquire_exec::ExecError;
        match err {
            ExecError::WslSecurity { root } => AcquireError::WslSecurityError { root },
            other => AcquireError::WebRequestFailed(other.to_string()),
        }
    }
}

impl From<dotnet_acquire_distro::DistroError> for AcquireError {
    fn from(err: dotnet_acquire_distro::DistroError) -> Self {
        use dotnet_acquire_distro::DistroError;
        match err {
            DistroError::Io(e) => AcquireError::Io(e),
            DistroError::Exec(e) => e.into(),
            DistroError::DistroUnknown => AcquireError::DistroUnknown,
            DistroError::RhelUnsupported => AcquireError::RhelUnsupported,
            DistroError::Unsupported { version } => AcquireError::Unsupported { version, reason: "not supported on this distribution".into() },
            DistroError::ConflictingInstallTypes { support } => AcquireError::ConflictingInstallTypes { support: support.to_string() },
            DistroError::CustomInstallExists { path } => AcquireError::CustomInstallExists { path },
            DistroError::NonZeroExit { exit_code } => AcquireError::NonZeroInstallerExit { installer_url: "distro package manager".into(), status: exit_code },
        }
    }
}

impl From<dotnet_acquire_installer::InstallerError> for AcquireError {
    fn from(err: dotnet_acquire_installer::InstallerError) -> Self {
        use dotnet_acquire_installer::InstallerError;
        match err {
            InstallerError::Io(e) => AcquireError::Io(e),
            InstallerError::Fetch(e) => e.into(),
            InstallerError::Exec(e) => e.into(),
            InstallerError::InstallScriptFailed { status, output } => AcquireError::InstallScriptFailed { status, output },
            InstallerError::NonZeroInstallerExit { installer_url, status } => AcquireError::NonZeroInstallerExit { installer_url, status },
            InstallerError::ConflictingGlobalWindowsInstall => AcquireError::ConflictingGlobalWindowsInstall,
            InstallerError::NoMatchingRelease { channel_version } => {
                AcquireError::VersionResolutionFailed { requested: channel_version }
            }
            InstallerError::NoMatchingRid { channel_version, rid } => {
                AcquireError::InstallValidationFailed { install_id: channel_version, reason: format!("no installer for rid '{rid}'") }
            }
            InstallerError::DownloadMissing { path } => AcquireError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, path.display().to_string())),
            InstallerError::Json(e) => AcquireError::VersionResolutionFailed { requested: e.to_string() },
        }
    }
}
