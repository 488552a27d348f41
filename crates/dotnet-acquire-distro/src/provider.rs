//! The common capability set every distro provider implements (spec §4.8
//! "Provider interface"), grounded in the teacher's
//! `SystemPackageManager` trait.

use crate::error::Result;
use crate::support::SupportStatus;
use async_trait::async_trait;
use dotnet_acquire_version::Version;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotnetMode {
    Runtime,
    AspNetCoreRuntime,
    Sdk,
}

#[async_trait]
pub trait DistroProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn install_dotnet(&self, version: &Version, mode: DotnetMode) -> Result<i32>;
    async fn uninstall_dotnet(&self, version: &Version, mode: DotnetMode) -> Result<i32>;
    async fn upgrade_dotnet(&self, version: &Version, mode: DotnetMode) -> Result<i32>;

    async fn get_installed_sdk_versions(&self) -> Result<Vec<String>>;
    async fn get_installed_runtime_versions(&self) -> Result<Vec<String>>;

    async fn get_installed_global_dotnet_path(&self, mode: DotnetMode) -> Result<Option<PathBuf>>;
    async fn get_installed_global_dotnet_version(&self, mode: DotnetMode) -> Result<Option<Version>>;

    async fn dotnet_package_exists_on_system(&self, version: &Version, mode: DotnetMode) -> Result<bool>;
    async fn get_dotnet_version_support_status(&self, version: &Version, mode: DotnetMode) -> Result<SupportStatus>;
    async fn get_recommended_dotnet_version(&self, mode: DotnetMode) -> Result<Version>;

    fn get_expected_distro_feed_install_dir(&self) -> PathBuf;
    fn get_expected_microsoft_feed_install_dir(&self) -> PathBuf;
}
