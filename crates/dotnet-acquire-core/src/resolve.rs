//! Step 1 of the acquisition algorithm: normalise a loose version request
//! into a fully specified [`Version`] (spec §4.6 step 1).

use crate::channel::fetch_channel_index;
use crate::config::AcquisitionConfig;
use crate::error::{AcquireError, Result};
use dotnet_acquire_fetch::WebFetcher;
use dotnet_acquire_paths::InstallMode;
use dotnet_acquire_version::{parse, Classification, Version};

/// Resolves `requested` to a fully specified version. Band-only or coarser
/// requests are resolved against release metadata; already-full versions
/// pass through untouched.
pub async fn normalise_version(
    requested: &str,
    mode: InstallMode,
    config: &AcquisitionConfig,
    fetcher: &WebFetcher,
    reject_previews: bool,
) -> Result<Version> {
    let parsed = parse(requested)?;

    let resolved = match parsed.classification() {
        Classification::Full => parsed,
        _ => resolve_via_release_metadata(&parsed, requested, mode, config, fetcher).await?,
    };

    if reject_previews && resolved.is_preview() {
        return Err(AcquireError::Unsupported {
            version: resolved.to_string(),
            reason: "preview versions are rejected by the caller's policy".into(),
        });
    }

    Ok(resolved)
}

async fn resolve_via_release_metadata(parsed: &Version, requested: &str, mode: InstallMode, config: &AcquisitionConfig, fetcher: &WebFetcher) -> Result<Version> {
    let (major, minor) = parsed.get_major_minor();
    let channel = format!("{major}.{}", minor.unwrap_or(0));
    let index = fetch_channel_index(fetcher, config, &channel).await?;

    let band = parsed.get_feature_band();
    let release = index
        .releases
        .iter()
        .find(|r| {
            let file_set = match mode {
                InstallMode::Sdk => &r.sdk,
                InstallMode::Runtime => &r.runtime,
                InstallMode::AspNetCoreRuntime => &r.aspnetcore_runtime,
            };
            let Some(file_set) = file_set else { return false };
            match band {
                Some(b) => parse(&file_set.version).map(|v| v.get_feature_band() == Some(b)).unwrap_or(false),
                None => true,
            }
        })
        .ok_or_else(|| AcquireError::VersionResolutionFailed { requested: requested.to_string() })?;

    let file_set = match mode {
        InstallMode::Sdk => release.sdk.as_ref(),
        InstallMode::Runtime => release.runtime.as_ref(),
        InstallMode::AspNetCoreRuntime => release.aspnetcore_runtime.as_ref(),
    }
    .ok_or_else(|| AcquireError::VersionResolutionFailed { requested: requested.to_string() })?;

    parse(&file_set.version).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotnet_acquire_version::parse;

    #[tokio::test]
    async fn full_version_is_returned_unchanged() {
        let config = AcquisitionConfig::default();
        let fetcher = WebFetcher::new_for_test();
        let resolved = normalise_version("8.0.100", InstallMode::Sdk, &config, &fetcher, false).await.unwrap();
        assert_eq!(resolved, parse("8.0.100").unwrap());
    }

    #[tokio::test]
    async fn preview_rejected_when_policy_requests_it() {
        let config = AcquisitionConfig::default();
        let fetcher = WebFetcher::new_for_test();
        let err = normalise_version("9.0.100-preview.1", InstallMode::Sdk, &config, &fetcher, true).await.unwrap_err();
        assert!(matches!(err, AcquireError::Unsupported { .. }));
    }
}
