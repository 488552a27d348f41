//! Pure representation of a .NET version string.
//!
//! Accepted shapes (spec §4.1):
//!   - `M`                 major only
//!   - `M.m`                major.minor
//!   - `M.m.Fxx`            feature band only, patch digits literally "xx"
//!   - `M.m.Fpp[-tag]`      fully specified, band 0-9, patch 00-99

use crate::error::{Result, VersionError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How precisely a version string pins down an install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Major,
    MajorMinor,
    Band,
    Full,
}

/// A parsed .NET version.
///
/// `feature_band` and `patch` are only meaningful for SDK-shaped versions;
/// runtime versions (which have no feature band) are represented the same
/// way with `feature_band` left unset and `patch` used as the plain patch
/// number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: Option<u32>,
    pub feature_band: Option<u8>,
    /// `None` for band-only versions (`M.m.Fxx`); `Some` once resolved.
    pub patch: Option<u8>,
    pub prerelease: Option<String>,
    classification: Classification,
}

impl Version {
    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn get_major(&self) -> u32 {
        self.major
    }

    pub fn get_minor(&self) -> Option<u32> {
        self.minor
    }

    pub fn get_major_minor(&self) -> (u32, Option<u32>) {
        (self.major, self.minor)
    }

    pub fn get_feature_band(&self) -> Option<u8> {
        self.feature_band
    }

    pub fn get_patch(&self) -> Option<u8> {
        self.patch
    }

    pub fn get_band_patch(&self) -> Option<(u8, u8)> {
        match (self.feature_band, self.patch) {
            (Some(b), Some(p)) => Some((b, p)),
            _ => None,
        }
    }

    /// True iff a prerelease tag is present, or the combined band+patch
    /// number falls in the `4NN`/`5NN` sentinel preview series documented by
    /// the .NET release process.
    pub fn is_preview(&self) -> bool {
        if self.prerelease.is_some() {
            return true;
        }
        if let Some((band, patch)) = self.get_band_patch() {
            let combined = band as u32 * 100 + patch as u32;
            matches!(combined / 100, 4 | 5)
        } else {
            false
        }
    }

    /// Construct a fully-specified version without going through string
    /// parsing (used by components that resolve a band to a concrete patch
    /// via release metadata).
    pub fn new_full(major: u32, minor: u32, feature_band: u8, patch: u8) -> Self {
        Self {
            major,
            minor: Some(minor),
            feature_band: Some(feature_band),
            patch: Some(patch),
            prerelease: None,
            classification: Classification::Full,
        }
    }

    pub fn with_prerelease(mut self, tag: impl Into<String>) -> Self {
        self.prerelease = Some(tag.into());
        self
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.classification {
            Classification::Major => write!(f, "{}", self.major),
            Classification::MajorMinor => write!(f, "{}.{}", self.major, self.minor.unwrap_or(0)),
            Classification::Band => write!(
                f,
                "{}.{}.{}xx",
                self.major,
                self.minor.unwrap_or(0),
                self.feature_band.unwrap_or(0)
            ),
            Classification::Full => {
                let band = self.feature_band.unwrap_or(0);
                let patch = self.patch.unwrap_or(0);
                write!(
                    f,
                    "{}.{}.{}{:02}",
                    self.major,
                    self.minor.unwrap_or(0),
                    band,
                    patch
                )?;
                if let Some(tag) = &self.prerelease {
                    write!(f, "-{}", tag)?;
                }
                Ok(())
            }
        }
    }
}

/// Parse a version string into a [`Version`], classifying its shape.
pub fn parse(s: &str) -> Result<Version> {
    let s = s.trim();
    if s.is_empty() {
        return Err(invalid(s, "empty version string"));
    }

    let (base, prerelease) = match s.split_once('-') {
        Some((base, tag)) => (base, Some(tag.to_string())),
        None => (s, None),
    };

    let parts: Vec<&str> = base.split('.').collect();
    match parts.as_slice() {
        [major] => {
            let major = parse_u32(major, s)?;
            if prerelease.is_some() {
                return Err(invalid(s, "prerelease tag not allowed on a major-only version"));
            }
            Ok(Version {
                major,
                minor: None,
                feature_band: None,
                patch: None,
                prerelease: None,
                classification: Classification::Major,
            })
        }
        [major, minor] => {
            let major = parse_u32(major, s)?;
            let minor = parse_u32(minor, s)?;
            if prerelease.is_some() {
                return Err(invalid(
                    s,
                    "prerelease tag not allowed on a major.minor version",
                ));
            }
            Ok(Version {
                major,
                minor: Some(minor),
                feature_band: None,
                patch: None,
                prerelease: None,
                classification: Classification::MajorMinor,
            })
        }
        [major, minor, third] => {
            let major = parse_u32(major, s)?;
            let minor = parse_u32(minor, s)?;
            parse_third_component(s, major, minor, third, prerelease)
        }
        _ => Err(invalid(s, "too many version components")),
    }
}

fn parse_third_component(
    original: &str,
    major: u32,
    minor: u32,
    third: &str,
    prerelease: Option<String>,
) -> Result<Version> {
    if third.len() != 3 {
        return Err(invalid(
            original,
            "feature-band component must be exactly 3 characters (Fxx or Fpp)",
        ));
    }
    let band_char = third.as_bytes()[0] as char;
    let band: u8 = band_char
        .to_digit(10)
        .filter(|d| *d <= 9)
        .ok_or_else(|| invalid(original, "feature band must be a single digit 0-9"))? as u8;

    let rest = &third[1..];
    if rest == "xx" {
        if prerelease.is_some() {
            return Err(invalid(
                original,
                "prerelease tag not allowed on a band-only version",
            ));
        }
        return Ok(Version {
            major,
            minor: Some(minor),
            feature_band: Some(band),
            patch: None,
            prerelease: None,
            classification: Classification::Band,
        });
    }

    let patch: u8 = rest
        .parse()
        .map_err(|_| invalid(original, "patch must be two decimal digits 00-99"))?;
    if rest.len() != 2 {
        return Err(invalid(original, "patch must be exactly two digits"));
    }

    Ok(Version {
        major,
        minor: Some(minor),
        feature_band: Some(band),
        patch: Some(patch),
        prerelease,
        classification: Classification::Full,
    })
}

fn parse_u32(component: &str, original: &str) -> Result<u32> {
    component
        .parse::<u32>()
        .map_err(|_| invalid(original, format!("'{}' is not a valid integer", component)))
}

fn invalid(version: impl Into<String>, reason: impl Into<String>) -> VersionError {
    VersionError::InvalidVersion {
        version: version.into(),
        reason: reason.into(),
    }
}

/// Convenience re-export of [`parse`]'s classification result.
pub fn classify(s: &str) -> Result<Classification> {
    parse(s).map(|v| v.classification())
}
