use std::path::PathBuf;

/// Result type alias for distro-resolution and provider operations.
pub type Result<T> = std::result::Result<T, DistroError>;

#[derive(Debug, thiserror::Error)]
pub enum DistroError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Exec(#[from] dotnet_acquire_exec::ExecError),

    #[error("could not determine the Linux distribution: /etc/os-release and /usr/lib/os-release were both unreadable or empty")]
    DistroUnknown,

    /// RHEL 7 is explicitly rejected (spec §4.8).
    #[error("RHEL 7 is not supported by this installer; see https://learn.microsoft.com/dotnet/core/install/linux-rhel#rhel-7-- for alternatives")]
    RhelUnsupported,

    #[error("version {version} is not supported on this distribution")]
    Unsupported { version: String },

    #[error("a {support} install already exists; installing via the other feed would conflict")]
    ConflictingInstallTypes { support: &'static str },

    /// Surfaced when a provider's install/upgrade command exits non-zero;
    /// the acquisition worker maps this onward to its own taxonomy.
    #[error("distro package operation exited with code {exit_code}")]
    NonZeroExit { exit_code: i32 },

    #[error("an existing install was found at '{}', outside the expected feed directory", path.display())]
    CustomInstallExists { path: PathBuf },
}
