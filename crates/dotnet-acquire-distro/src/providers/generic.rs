//! Fallback provider for unrecognised distributions: no package manager
//! integration, so install/uninstall/upgrade always report unsupported and
//! every query reflects whatever is already on `PATH` (spec §4.8 "Unknown
//! distros fall through to the generic provider").

use crate::error::{DistroError, Result};
use crate::provider::{DistroProvider, DotnetMode};
use crate::support::SupportStatus;
use async_trait::async_trait;
use dotnet_acquire_version::{parse, Version};
use std::path::PathBuf;

pub struct GenericProvider;

impl GenericProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GenericProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DistroProvider for GenericProvider {
    fn name(&self) -> &'static str {
        "generic"
    }

    async fn install_dotnet(&self, version: &Version, _mode: DotnetMode) -> Result<i32> {
        Err(DistroError::Unsupported { version: version.to_string() })
    }

    async fn uninstall_dotnet(&self, version: &Version, _mode: DotnetMode) -> Result<i32> {
        Err(DistroError::Unsupported { version: version.to_string() })
    }

    async fn upgrade_dotnet(&self, version: &Version, _mode: DotnetMode) -> Result<i32> {
        Err(DistroError::Unsupported { version: version.to_string() })
    }

    async fn get_installed_sdk_versions(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn get_installed_runtime_versions(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn get_installed_global_dotnet_path(&self, _mode: DotnetMode) -> Result<Option<PathBuf>> {
        Ok(which::which("dotnet").ok())
    }

    async fn get_installed_global_dotnet_version(&self, _mode: DotnetMode) -> Result<Option<Version>> {
        Ok(None)
    }

    async fn dotnet_package_exists_on_system(&self, _version: &Version, _mode: DotnetMode) -> Result<bool> {
        Ok(false)
    }

    async fn get_dotnet_version_support_status(&self, _version: &Version, _mode: DotnetMode) -> Result<SupportStatus> {
        Ok(SupportStatus::Unknown)
    }

    async fn get_recommended_dotnet_version(&self, _mode: DotnetMode) -> Result<Version> {
        Ok(parse("8.0").unwrap())
    }

    fn get_expected_distro_feed_install_dir(&self) -> PathBuf {
        PathBuf::from("/usr/share/dotnet")
    }

    fn get_expected_microsoft_feed_install_dir(&self) -> PathBuf {
        PathBuf::from("/usr/share/dotnet")
    }
}
