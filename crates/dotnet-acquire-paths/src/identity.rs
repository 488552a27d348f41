use dotnet_acquire_version::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of install this is (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstallMode {
    Runtime,
    AspNetCoreRuntime,
    Sdk,
}

impl fmt::Display for InstallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstallMode::Runtime => "runtime",
            InstallMode::AspNetCoreRuntime => "aspnetcore-runtime",
            InstallMode::Sdk => "sdk",
        };
        write!(f, "{s}")
    }
}

/// Whether this install is managed locally by this tool or lives at the
/// machine-wide (global) location (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstallScope {
    Local,
    Global,
}

impl fmt::Display for InstallScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstallScope::Local => "local",
            InstallScope::Global => "global",
        };
        write!(f, "{s}")
    }
}

/// The four components that together identify a single shareable install
/// (spec §3: "Install identity"). `install_id()` is the deterministic
/// primary key of the Install Tracker's registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstallIdentity {
    pub version: Version,
    pub mode: InstallMode,
    pub architecture: String,
    pub scope: InstallScope,
}

impl InstallIdentity {
    pub fn new(version: Version, mode: InstallMode, architecture: impl Into<String>, scope: InstallScope) -> Self {
        Self {
            version,
            mode,
            architecture: architecture.into(),
            scope,
        }
    }

    /// A deterministic, filesystem-safe identity string. Two requests that
    /// normalise to the same components share the same on-disk install
    /// (spec §3 invariant).
    pub fn install_id(&self) -> String {
        format!(
            "{}~{}~{}~{}",
            self.version, self.mode, self.architecture, self.scope
        )
    }

    /// Inverse of [`Self::install_id`], used by the Acquisition Worker to
    /// recover the version/mode/scope of an existing tracker record when
    /// evaluating compatibility policies against it.
    pub fn parse(install_id: &str) -> Option<Self> {
        let mut parts = install_id.split('~');
        let version = dotnet_acquire_version::parse(parts.next()?).ok()?;
        let mode = match parts.next()? {
            "runtime" => InstallMode::Runtime,
            "aspnetcore-runtime" => InstallMode::AspNetCoreRuntime,
            "sdk" => InstallMode::Sdk,
            _ => return None,
        };
        let architecture = parts.next()?.to_string();
        let scope = match parts.next()? {
            "local" => InstallScope::Local,
            "global" => InstallScope::Global,
            _ => return None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self { version, mode, architecture, scope })
    }
}

impl fmt::Display for InstallIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.install_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotnet_acquire_version::parse;

    #[test]
    fn install_id_is_deterministic() {
        let id_a = InstallIdentity::new(parse("7.0.100").unwrap(), InstallMode::Sdk, "x64", InstallScope::Local);
        let id_b = InstallIdentity::new(parse("7.0.100").unwrap(), InstallMode::Sdk, "x64", InstallScope::Local);
        assert_eq!(id_a.install_id(), id_b.install_id());
    }

    #[test]
    fn install_id_differs_by_mode() {
        let sdk = InstallIdentity::new(parse("7.0.100").unwrap(), InstallMode::Sdk, "x64", InstallScope::Local);
        let runtime = InstallIdentity::new(parse("7.0.100").unwrap(), InstallMode::Runtime, "x64", InstallScope::Local);
        assert_ne!(sdk.install_id(), runtime.install_id());
    }

    #[test]
    fn parse_recovers_identity_from_install_id() {
        let original = InstallIdentity::new(parse("7.0.100").unwrap(), InstallMode::Sdk, "x64", InstallScope::Local);
        let recovered = InstallIdentity::parse(&original.install_id()).unwrap();
        assert_eq!(original, recovered);
    }

    #[test]
    fn parse_rejects_malformed_ids() {
        assert!(InstallIdentity::parse("not-an-install-id").is_none());
    }
}
