//! Explicit configuration, constructed from fields with environment
//! overrides rather than a config-file framework — the spec has no notion
//! of a user config file, only explicit per-request fields and a couple of
//! environment variables (spec §6 "Environment variables").

use dotnet_acquire_paths::StorageLayout;
use std::path::PathBuf;

/// Default base URL releases are resolved against. Overridable for airgapped
/// mirrors or tests.
pub const DEFAULT_RELEASE_METADATA_BASE_URL: &str = "https://dotnetcli.blob.core.windows.net/dotnet/release-metadata";

#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    pub storage_root: PathBuf,
    pub release_metadata_base_url: String,
    pub proxy_url: Option<String>,
    /// Scales every TTL the shared cache applies (spec §4.3 `timeToLiveMultiplier`).
    pub ttl_multiplier: f64,
    pub retry_budget: usize,
    pub timeout_sec: u64,
}

impl AcquisitionConfig {
    /// Builds configuration from explicit fields with sane defaults, then
    /// layers on environment overrides the way the teacher's config layer
    /// does (explicit construction first, env second).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("DOTNET_ACQUIRE_RELEASE_METADATA_URL") {
            config.release_metadata_base_url = url;
        }
        if let Ok(proxy) = std::env::var("HTTPS_PROXY").or_else(|_| std::env::var("https_proxy")) {
            config.proxy_url = Some(proxy);
        }
        config
    }

    pub fn storage_layout(&self) -> StorageLayout {
        StorageLayout::new(&self.storage_root)
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            storage_root: StorageLayout::default_root().root().to_path_buf(),
            release_metadata_base_url: DEFAULT_RELEASE_METADATA_BASE_URL.to_string(),
            proxy_url: None,
            ttl_multiplier: 1.0,
            retry_budget: 4,
            timeout_sec: 100,
        }
    }
}

/// Saves and clears `HOME` so a scoped operation can run against a
/// sandboxed home directory, restoring the original value on drop (spec §6
/// "Environment variables", `VSCODE_DOTNET_INSTALL_TOOL_ORIGINAL_HOME`).
///
/// If the original value was literally the string `"undefined"` (a known
/// artefact of the host this spec was distilled from), `HOME` is unset
/// rather than restored to that sentinel.
pub struct ScopedHomeOverride {
    original: Option<String>,
}

impl ScopedHomeOverride {
    pub fn new(new_home: &std::path::Path) -> Self {
        let original = std::env::var("HOME").ok();
        std::env::set_var("VSCODE_DOTNET_INSTALL_TOOL_ORIGINAL_HOME", original.as_deref().unwrap_or(""));
        std::env::set_var("HOME", new_home);
        Self { original }
    }
}

impl Drop for ScopedHomeOverride {
    fn drop(&mut self) {
        std::env::remove_var("VSCODE_DOTNET_INSTALL_TOOL_ORIGINAL_HOME");
        match self.original.as_deref() {
            Some("undefined") | None => std::env::remove_var("HOME"),
            Some(value) => std::env::set_var("HOME", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_default_storage_root() {
        let config = AcquisitionConfig::default();
        assert!(config.storage_root.ends_with(".dotnet-acquire"));
    }

    #[test]
    fn scoped_home_override_restores_previous_value() {
        std::env::set_var("HOME", "/original/home");
        {
            let _guard = ScopedHomeOverride::new(std::path::Path::new("/tmp/sandboxed-home"));
            assert_eq!(std::env::var("HOME").unwrap(), "/tmp/sandboxed-home");
        }
        assert_eq!(std::env::var("HOME").unwrap(), "/original/home");
        std::env::remove_var("HOME");
    }

    #[test]
    fn scoped_home_override_unsets_when_original_was_literal_undefined() {
        std::env::set_var("HOME", "undefined");
        {
            let _guard = ScopedHomeOverride::new(std::path::Path::new("/tmp/sandboxed-home"));
        }
        assert!(std::env::var("HOME").is_err());
    }
}
