//! Fetches and parses the release-metadata channel index (spec §4.6 step 1,
//! §6 "Wire formats consumed"), shared by version normalisation and the
//! Global Installer's patch resolution.

use crate::config::AcquisitionConfig;
use crate::error::Result;
use dotnet_acquire_fetch::{FetchContext, FetchOptions, WebFetcher};
use dotnet_acquire_installer::ChannelIndex;

const CHANNEL_INDEX_TTL_MS: u64 = 60 * 60 * 1000;

pub async fn fetch_channel_index(fetcher: &WebFetcher, config: &AcquisitionConfig, channel: &str) -> Result<ChannelIndex> {
    let url = format!("{}/{channel}/releases.json", config.release_metadata_base_url);
    let ctx = FetchContext::default().with_timeout_sec(config.timeout_sec);
    let body = fetcher.get_cached(&url, &ctx, &FetchOptions::default(), CHANNEL_INDEX_TTL_MS).await?;
    Ok(serde_json::from_str(&body).map_err(|e| dotnet_acquire_installer::InstallerError::Json(e))?)
}
