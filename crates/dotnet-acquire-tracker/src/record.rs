//! Registry entities (spec §3, §4.5).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A tracked install and its owning consumers. `owners` holds `Some(id)` for
/// a live extension id and at most one `None`, the legacy null sentinel left
/// behind when an owner was lost in migration (spec §3 invariant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallRecord {
    pub install_id: String,
    pub owners: Vec<Option<String>>,
}

impl InstallRecord {
    pub fn new(install_id: impl Into<String>) -> Self {
        Self {
            install_id: install_id.into(),
            owners: Vec::new(),
        }
    }

    /// Adds `owner` unless already present. A no-op for a duplicate id,
    /// matching spec §4.5 `trackInstall`.
    pub fn add_owner(&mut self, owner: Option<&str>) {
        let owner = owner.map(str::to_string);
        if self.owners.contains(&owner) {
            return;
        }
        self.owners.push(owner);
    }

    pub fn remove_owner(&mut self, owner: Option<&str>) {
        let owner = owner.map(str::to_string);
        self.owners.retain(|o| *o != owner);
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// An install whose owner set emptied while a live session still depended on
/// it; drained later once that dependency clears (spec §3, §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraveyardEntry {
    pub install_id: String,
    pub path: PathBuf,
}

/// Records that `session_id` currently depends on the install at `path`
/// (spec §4.5 `markInstallInUse`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InUseMark {
    pub session_id: String,
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_owner_is_idempotent() {
        let mut record = InstallRecord::new("7.0.100~sdk~x64~local");
        record.add_owner(Some("ext-a"));
        record.add_owner(Some("ext-a"));
        assert_eq!(record.owners.len(), 1);
    }

    #[test]
    fn owner_arithmetic_matches_k_minus_j() {
        let mut record = InstallRecord::new("7.0.100~sdk~x64~local");
        record.add_owner(Some("ext-a"));
        record.add_owner(Some("ext-b"));
        record.remove_owner(Some("ext-a"));
        assert_eq!(record.owners, vec![Some("ext-b".to_string())]);
        assert!(!record.is_empty());
        record.remove_owner(Some("ext-b"));
        assert!(record.is_empty());
    }

    #[test]
    fn at_most_one_null_sentinel() {
        let mut record = InstallRecord::new("7.0.100~sdk~x64~local");
        record.add_owner(None);
        record.add_owner(None);
        assert_eq!(record.owners, vec![None]);
    }
}
