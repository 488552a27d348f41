//! On-disk persisted registry state (spec §4.5, §6 "Persisted state").

use crate::error::Result;
use crate::record::{GraveyardEntry, InUseMark, InstallRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Legacy installs were persisted as bare strings; current ones as objects.
/// `deserialize_installed` migrates the former to `{installId, owners:[null]}`
/// on first read (spec §4.5).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawInstalled {
    Legacy(String),
    Record(InstallRecord),
}

fn deserialize_installed<'de, D>(deserializer: D) -> std::result::Result<Vec<InstallRecord>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Vec<RawInstalled> = Vec::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|entry| match entry {
            RawInstalled::Legacy(install_id) => {
                debug!(install_id = %install_id, "migrating legacy bare-string install record");
                let mut record = InstallRecord::new(install_id);
                record.add_owner(None);
                record
            }
            RawInstalled::Record(record) => record,
        })
        .collect())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryState {
    #[serde(default, deserialize_with = "deserialize_installed")]
    pub installed: Vec<InstallRecord>,
    #[serde(default)]
    pub graveyard: Vec<GraveyardEntry>,
    #[serde(default)]
    pub in_use: Vec<InUseMark>,
}

impl RegistryState {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let bytes = std::fs::read(path)?;
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Write-then-rename so a crash mid-write never leaves a truncated
    /// registry file behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(self)?;
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn migrates_legacy_bare_string_entries() {
        let raw = json!({
            "installed": ["7.0.100~sdk~x64~local"],
            "graveyard": [],
            "in_use": [],
        });
        let state: RegistryState = serde_json::from_value(raw).unwrap();
        assert_eq!(state.installed.len(), 1);
        assert_eq!(state.installed[0].install_id, "7.0.100~sdk~x64~local");
        assert_eq!(state.installed[0].owners, vec![None]);
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker-state.json");

        let mut state = RegistryState::default();
        let mut record = InstallRecord::new("7.0.100~sdk~x64~local");
        record.add_owner(Some("ext-a"));
        state.installed.push(record);
        state.save(&path).unwrap();

        let loaded = RegistryState::load(&path).unwrap();
        assert_eq!(loaded.installed.len(), 1);
        assert_eq!(loaded.installed[0].owners, vec![Some("ext-a".to_string())]);
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.json");
        let state = RegistryState::load(&path).unwrap();
        assert!(state.installed.is_empty());
        assert!(state.graveyard.is_empty());
    }
}
