//! The single public request shape `acquire` accepts (spec §4.6).

use dotnet_acquire_paths::InstallScope;
use dotnet_acquire_version::CompatibilityPolicy;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct AcquireRequest {
    /// Loose or fully specified version string (spec §4.1 accepted shapes).
    pub version: String,
    pub mode: dotnet_acquire_paths::InstallMode,
    /// `None` lets the Path Finder accept any architecture.
    pub architecture: Option<String>,
    pub requesting_extension_id: Option<String>,
    pub policy: CompatibilityPolicy,
    pub timeout_sec: u64,
    pub scope: InstallScope,
    pub reject_previews: bool,
    pub cancellation: CancellationToken,
}

impl AcquireRequest {
    pub fn new(version: impl Into<String>, mode: dotnet_acquire_paths::InstallMode) -> Self {
        Self {
            version: version.into(),
            mode,
            architecture: None,
            requesting_extension_id: None,
            policy: CompatibilityPolicy::Minor,
            timeout_sec: 100,
            scope: InstallScope::Local,
            reject_previews: false,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_architecture(mut self, architecture: impl Into<String>) -> Self {
        self.architecture = Some(architecture.into());
        self
    }

    pub fn with_extension_id(mut self, id: impl Into<String>) -> Self {
        self.requesting_extension_id = Some(id.into());
        self
    }

    pub fn with_policy(mut self, policy: CompatibilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_scope(mut self, scope: InstallScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

/// The validated, located install `acquire` hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireResult {
    pub path: std::path::PathBuf,
    pub install_id: String,
}
