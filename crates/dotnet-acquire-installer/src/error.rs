use std::path::PathBuf;

/// Result type alias for installer operations.
pub type Result<T> = std::result::Result<T, InstallerError>;

#[derive(Debug, thiserror::Error)]
pub enum InstallerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Fetch(#[from] dotnet_acquire_fetch::FetchError),

    #[error(transparent)]
    Exec(#[from] dotnet_acquire_exec::ExecError),

    /// The install script exited non-zero. `output` is sanitized of the
    /// current user's name before it reaches telemetry/logging.
    #[error("install script exited with status {status}: {output}")]
    InstallScriptFailed { status: i32, output: String },

    /// The global installer binary exited non-zero with a recognised code.
    #[error("installer for {installer_url} exited with status {status}")]
    NonZeroInstallerExit { installer_url: String, status: i32 },

    /// Windows elevation was refused while a global install was already
    /// mid-flight.
    #[error("a conflicting global .NET install is already in progress on Windows")]
    ConflictingGlobalWindowsInstall,

    /// The channel index had no release matching the request.
    #[error("no release in the channel index matches {channel_version}")]
    NoMatchingRelease { channel_version: String },

    /// The channel index had a release but no file for this OS/architecture.
    #[error("no installer file for rid '{rid}' in channel {channel_version}")]
    NoMatchingRid { channel_version: String, rid: String },

    #[error("downloaded installer did not appear at {path}")]
    DownloadMissing { path: PathBuf },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
