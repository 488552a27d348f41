//! `/etc/os-release` parsing, with the `/usr/lib/os-release` fallback and a
//! short cache on the result (spec §4.8 "Distro detection").

use crate::error::{DistroError, Result};
use dotnet_acquire_cache::InMemoryCache;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// How long a detected `(distro, version)` pair is cached for.
pub const SYSTEM_INFO_CACHE_TTL_MS: u64 = 60 * 60 * 1000;

const PRIMARY_PATH: &str = "/etc/os-release";
const FALLBACK_PATH: &str = "/usr/lib/os-release";
const CACHE_KEY: &str = "dotnet-acquire:distro-version-pair";

/// A detected distribution name and version (spec §3 `DistroVersionPair`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistroVersionPair {
    pub name: String,
    pub version: String,
}

/// Detects the host's distro/version, consulting the cache first.
pub fn detect(cache: &InMemoryCache) -> Result<DistroVersionPair> {
    if let Some(cached) = cache.get_typed::<DistroVersionPair>(CACHE_KEY) {
        return Ok(cached);
    }

    let pair = detect_uncached()?;
    cache.put(CACHE_KEY, json!(pair), SYSTEM_INFO_CACHE_TTL_MS);
    Ok(pair)
}

fn detect_uncached() -> Result<DistroVersionPair> {
    let contents = std::fs::read_to_string(PRIMARY_PATH)
        .or_else(|_| std::fs::read_to_string(FALLBACK_PATH))
        .unwrap_or_default();

    let fields = parse_os_release(&contents);
    let name = fields.get("NAME").cloned().unwrap_or_default();
    let version = fields.get("VERSION_ID").cloned().unwrap_or_default();

    if name.is_empty() || version.is_empty() {
        debug!("os-release fields empty or missing");
        return Err(DistroError::DistroUnknown);
    }

    Ok(DistroVersionPair { name, version })
}

/// Parses `KEY=value` pairs, stripping surrounding single or double quotes.
fn parse_os_release(contents: &str) -> std::collections::HashMap<String, String> {
    contents
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), unquote(value.trim())))
        })
        .collect()
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    if value.len() >= 2 {
        let bytes = value.as_bytes();
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_fields() {
        let contents = "NAME=\"Ubuntu\"\nVERSION_ID=\"22.04\"\nID=ubuntu\n";
        let fields = parse_os_release(contents);
        assert_eq!(fields.get("NAME").unwrap(), "Ubuntu");
        assert_eq!(fields.get("VERSION_ID").unwrap(), "22.04");
    }

    #[test]
    fn parses_unquoted_fields() {
        let contents = "NAME=Fedora\nVERSION_ID=39\n";
        let fields = parse_os_release(contents);
        assert_eq!(fields.get("NAME").unwrap(), "Fedora");
        assert_eq!(fields.get("VERSION_ID").unwrap(), "39");
    }

    #[test]
    fn ignores_comments_and_blank_lines() {
        let contents = "# a comment\n\nNAME=Debian\nVERSION_ID=12\n";
        let fields = parse_os_release(contents);
        assert_eq!(fields.len(), 2);
    }
}
