//! Argument parsing for the `dotnet-acquire` harness binary.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "dotnet-acquire")]
#[command(about = "Resolve, install and locate .NET hosts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose (debug) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Root directory installs are managed under. Defaults to the
    /// platform-appropriate storage root.
    #[arg(long, global = true)]
    pub storage_root: Option<std::path::PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Sdk,
    Runtime,
    AspnetcoreRuntime,
}

impl From<ModeArg> for dotnet_acquire_core::InstallMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Sdk => dotnet_acquire_core::InstallMode::Sdk,
            ModeArg::Runtime => dotnet_acquire_core::InstallMode::Runtime,
            ModeArg::AspnetcoreRuntime => dotnet_acquire_core::InstallMode::AspNetCoreRuntime,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ScopeArg {
    Local,
    Global,
}

impl From<ScopeArg> for dotnet_acquire_core::InstallScope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Local => dotnet_acquire_core::InstallScope::Local,
            ScopeArg::Global => dotnet_acquire_core::InstallScope::Global,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    Disable,
    Patch,
    Feature,
    Minor,
    Major,
}

impl From<PolicyArg> for dotnet_acquire_core::CompatibilityPolicy {
    fn from(value: PolicyArg) -> Self {
        use dotnet_acquire_core::CompatibilityPolicy;
        match value {
            PolicyArg::Disable => CompatibilityPolicy::Disable,
            PolicyArg::Patch => CompatibilityPolicy::Patch,
            PolicyArg::Feature => CompatibilityPolicy::Feature,
            PolicyArg::Minor => CompatibilityPolicy::Minor,
            PolicyArg::Major => CompatibilityPolicy::Major,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a version, installing it if necessary, and print its path.
    Acquire {
        /// Version request: major, major.minor, feature band, or fully specified.
        version: String,
        #[arg(long, value_enum, default_value = "sdk")]
        mode: ModeArg,
        #[arg(long, value_enum, default_value = "local")]
        scope: ScopeArg,
        #[arg(long, value_enum, default_value = "minor")]
        policy: PolicyArg,
        /// Extension id to record as an owner of the resulting install.
        #[arg(long)]
        extension_id: Option<String>,
        /// Target architecture (e.g. x64, arm64). Defaults to the host's.
        #[arg(long)]
        arch: Option<String>,
        /// Reject preview/prerelease versions.
        #[arg(long)]
        reject_previews: bool,
    },

    /// Look for an already-installed `dotnet` without installing anything.
    FindPath {
        version: String,
        #[arg(long, value_enum, default_value = "sdk")]
        mode: ModeArg,
        #[arg(long, value_enum, default_value = "minor")]
        policy: PolicyArg,
        /// Only consider `dotnet` found on PATH, skipping this tool's own registry.
        #[arg(long)]
        disable_local_lookup: bool,
    },

    /// List every install this tool instance is tracking.
    ListInstalled,

    /// Remove every install owned (at least partially) by `extension-id`.
    UninstallAll {
        #[arg(long)]
        extension_id: Option<String>,
    },
}
