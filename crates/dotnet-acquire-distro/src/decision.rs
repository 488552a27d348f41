//! `ValidateAndInstallSDK(v)` (spec §4.8 "Install decision").
//!
//! All steps here assume the caller already holds the tracker's global
//! modifier lock; this module performs no locking of its own.

use crate::error::{DistroError, Result};
use crate::provider::{DistroProvider, DotnetMode};
use crate::support::SupportStatus;
use dotnet_acquire_version::Version;
use std::path::Path;

/// Exit code meaning "no install action was needed, an upgrade was applied".
pub const OK_UPDATE: i32 = 11188;
/// Exit code meaning "no install action was needed, already present".
pub const OK_ALREADY_EXISTS: i32 = 11166;

/// Runs the full five-step decision flow and, if an install is actually
/// required, performs it. Returns the resulting exit code.
pub async fn validate_and_install_sdk(provider: &dyn DistroProvider, version: &Version, mode: DotnetMode) -> Result<i32> {
    let support = provider.get_dotnet_version_support_status(version, mode).await?;
    if support == SupportStatus::Unsupported {
        return Err(DistroError::Unsupported { version: version.to_string() });
    }

    verify_no_conflicting_install_type(provider, support).await?;

    let existing_path = provider.get_installed_global_dotnet_path(mode).await?;
    verify_no_custom_install(provider, existing_path.as_deref())?;

    match update_or_reject_if_no_install_needed(provider, version, mode).await? {
        Some(code) => Ok(code),
        None => {
            let code = provider.install_dotnet(version, mode).await?;
            if code == 0 {
                Ok(0)
            } else {
                Err(DistroError::NonZeroExit { exit_code: code })
            }
        }
    }
}

/// Step 2: a `Distro`-support install must not coexist with a vendor-feed
/// directory, and vice versa for `Microsoft`.
async fn verify_no_conflicting_install_type(provider: &dyn DistroProvider, support: SupportStatus) -> Result<()> {
    let conflicting_dir = match support {
        SupportStatus::Distro => provider.get_expected_microsoft_feed_install_dir(),
        SupportStatus::Microsoft => provider.get_expected_distro_feed_install_dir(),
        _ => return Ok(()),
    };
    if conflicting_dir.exists() {
        return Err(DistroError::ConflictingInstallTypes { support: support.display_name() });
    }
    Ok(())
}

/// Step 3: an install outside either expected feed directory is a custom
/// install we refuse to manage.
fn verify_no_custom_install(provider: &dyn DistroProvider, existing_path: Option<&Path>) -> Result<()> {
    let Some(existing_path) = existing_path else {
        return Ok(());
    };
    let distro_dir = provider.get_expected_distro_feed_install_dir();
    let microsoft_dir = provider.get_expected_microsoft_feed_install_dir();
    if existing_path != distro_dir && existing_path != microsoft_dir {
        return Err(DistroError::CustomInstallExists { path: existing_path.to_path_buf() });
    }
    Ok(())
}

/// Step 4. Returns `Some(exit_code)` when no install is needed (either
/// rejected as a downgrade, upgraded in place, or already present), or
/// `None` when the caller should proceed to `installDotnet`.
async fn update_or_reject_if_no_install_needed(provider: &dyn DistroProvider, version: &Version, mode: DotnetMode) -> Result<Option<i32>> {
    let Some(existing) = provider.get_installed_global_dotnet_version(mode).await? else {
        return Ok(None);
    };

    if existing.get_major_minor() != version.get_major_minor() {
        return Ok(None);
    }

    let mut is_patch_upgrade = false;
    if let (Some(existing_bp), Some(requested_bp)) = (existing.get_band_patch(), version.get_band_patch()) {
        if existing_bp > requested_bp {
            return Err(DistroError::Unsupported { version: version.to_string() });
        }
        is_patch_upgrade = requested_bp > existing_bp;
    }

    let package_exists = provider.dotnet_package_exists_on_system(version, mode).await?;

    if package_exists || is_patch_upgrade {
        let code = provider.upgrade_dotnet(version, mode).await?;
        return if code == 0 { Ok(Some(OK_UPDATE)) } else { Err(DistroError::NonZeroExit { exit_code: code }) };
    }

    Ok(Some(OK_ALREADY_EXISTS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dotnet_acquire_version::parse;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicI32, Ordering};

    struct FakeProvider {
        support: SupportStatus,
        existing_path: Option<PathBuf>,
        existing_version: Option<Version>,
        package_exists: bool,
        distro_dir: PathBuf,
        microsoft_dir: PathBuf,
        install_calls: AtomicI32,
        upgrade_calls: AtomicI32,
    }

    impl FakeProvider {
        fn new() -> Self {
            Self {
                support: SupportStatus::Distro,
                existing_path: None,
                existing_version: None,
                package_exists: false,
                distro_dir: PathBuf::from("/usr/lib64/dotnet"),
                microsoft_dir: PathBuf::from("/usr/share/dotnet"),
                install_calls: AtomicI32::new(0),
                upgrade_calls: AtomicI32::new(0),
            }
        }
    }

    #[async_trait]
    impl DistroProvider for FakeProvider {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn install_dotnet(&self, _version: &Version, _mode: DotnetMode) -> Result<i32> {
            self.install_calls.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }

        async fn uninstall_dotnet(&self, _version: &Version, _mode: DotnetMode) -> Result<i32> {
            Ok(0)
        }

        async fn upgrade_dotnet(&self, _version: &Version, _mode: DotnetMode) -> Result<i32> {
            self.upgrade_calls.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }

        async fn get_installed_sdk_versions(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn get_installed_runtime_versions(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn get_installed_global_dotnet_path(&self, _mode: DotnetMode) -> Result<Option<PathBuf>> {
            Ok(self.existing_path.clone())
        }

        async fn get_installed_global_dotnet_version(&self, _mode: DotnetMode) -> Result<Option<Version>> {
            Ok(self.existing_version.clone())
        }

        async fn dotnet_package_exists_on_system(&self, _version: &Version, _mode: DotnetMode) -> Result<bool> {
            Ok(self.package_exists)
        }

        async fn get_dotnet_version_support_status(&self, _version: &Version, _mode: DotnetMode) -> Result<SupportStatus> {
            Ok(self.support)
        }

        async fn get_recommended_dotnet_version(&self, _mode: DotnetMode) -> Result<Version> {
            Ok(parse("8.0").unwrap())
        }

        fn get_expected_distro_feed_install_dir(&self) -> PathBuf {
            self.distro_dir.clone()
        }

        fn get_expected_microsoft_feed_install_dir(&self) -> PathBuf {
            self.microsoft_dir.clone()
        }
    }

    #[tokio::test]
    async fn unsupported_version_is_rejected_before_any_other_step() {
        let mut provider = FakeProvider::new();
        provider.support = SupportStatus::Unsupported;
        let version = parse("8.0.100").unwrap();
        let err = validate_and_install_sdk(&provider, &version, DotnetMode::Sdk).await.unwrap_err();
        assert!(matches!(err, DistroError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn no_existing_install_proceeds_to_install_dotnet() {
        let provider = FakeProvider::new();
        let version = parse("8.0.100").unwrap();
        let code = validate_and_install_sdk(&provider, &version, DotnetMode::Sdk).await.unwrap();
        assert_eq!(code, 0);
        assert_eq!(provider.install_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn same_major_minor_lower_patch_upgrades() {
        let mut provider = FakeProvider::new();
        provider.existing_version = Some(Version::new_full(8, 0, 1, 0));
        let requested = Version::new_full(8, 0, 1, 5);
        let code = validate_and_install_sdk(&provider, &requested, DotnetMode::Sdk).await.unwrap();
        assert_eq!(code, OK_UPDATE);
        assert_eq!(provider.upgrade_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn same_major_minor_higher_existing_patch_rejects_downgrade() {
        let mut provider = FakeProvider::new();
        provider.existing_version = Some(Version::new_full(8, 0, 1, 20));
        let requested = Version::new_full(8, 0, 1, 5);
        let err = validate_and_install_sdk(&provider, &requested, DotnetMode::Sdk).await.unwrap_err();
        assert!(matches!(err, DistroError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn identical_version_already_present_reports_already_exists() {
        let mut provider = FakeProvider::new();
        provider.existing_version = Some(Version::new_full(8, 0, 1, 5));
        let requested = Version::new_full(8, 0, 1, 5);
        let code = validate_and_install_sdk(&provider, &requested, DotnetMode::Sdk).await.unwrap();
        assert_eq!(code, OK_ALREADY_EXISTS);
        assert_eq!(provider.upgrade_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn conflicting_microsoft_feed_install_is_rejected() {
        let mut provider = FakeProvider::new();
        provider.microsoft_dir = PathBuf::from("/tmp/does-not-matter");
        std::fs::create_dir_all(&provider.microsoft_dir).ok();
        let version = parse("8.0.100").unwrap();
        let err = validate_and_install_sdk(&provider, &version, DotnetMode::Sdk).await.unwrap_err();
        std::fs::remove_dir_all(&provider.microsoft_dir).ok();
        assert!(matches!(err, DistroError::ConflictingInstallTypes { .. }));
    }

    #[tokio::test]
    async fn custom_install_outside_feed_dirs_is_rejected() {
        let mut provider = FakeProvider::new();
        provider.existing_path = Some(PathBuf::from("/opt/custom-dotnet"));
        let version = parse("8.0.100").unwrap();
        let err = validate_and_install_sdk(&provider, &version, DotnetMode::Sdk).await.unwrap_err();
        assert!(matches!(err, DistroError::CustomInstallExists { .. }));
    }
}
