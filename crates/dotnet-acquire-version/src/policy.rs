//! Compatibility policy and ordering over [`Version`]s.

use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How loosely a candidate install may satisfy a requested version.
///
/// The `latest*` variants are accepted as synonyms of their non-`latest`
/// counterpart: spec §4.1 describes identical comparison semantics for
/// `patch`/`latestPatch`, `feature`/`latestFeature`, `minor`/`latestMinor`,
/// and `major`/`latestMajor` — the `latest*` spelling only changes how the
/// Acquisition Worker picks among several compatible candidates, not the
/// predicate itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompatibilityPolicy {
    Disable,
    Patch,
    LatestPatch,
    Feature,
    LatestFeature,
    Minor,
    LatestMinor,
    Major,
    LatestMajor,
}

impl CompatibilityPolicy {
    fn dimension(self) -> Dimension {
        match self {
            CompatibilityPolicy::Disable => Dimension::Exact,
            CompatibilityPolicy::Patch | CompatibilityPolicy::LatestPatch => Dimension::Patch,
            CompatibilityPolicy::Feature | CompatibilityPolicy::LatestFeature => Dimension::Feature,
            CompatibilityPolicy::Minor | CompatibilityPolicy::LatestMinor => Dimension::Minor,
            CompatibilityPolicy::Major | CompatibilityPolicy::LatestMajor => Dimension::Major,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Exact,
    Patch,
    Feature,
    Minor,
    Major,
}

/// Compare two versions component-wise: major, minor, feature band, patch.
/// Missing components compare as 0. A prerelease tag makes a version strictly
/// less than the otherwise-identical non-prerelease version.
pub fn compare(a: &Version, b: &Version) -> Ordering {
    let a_tuple = (
        a.major,
        a.minor.unwrap_or(0),
        a.feature_band.unwrap_or(0),
        a.patch.unwrap_or(0),
    );
    let b_tuple = (
        b.major,
        b.minor.unwrap_or(0),
        b.feature_band.unwrap_or(0),
        b.patch.unwrap_or(0),
    );
    match a_tuple.cmp(&b_tuple) {
        Ordering::Equal => match (a.prerelease.is_some(), b.prerelease.is_some()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => Ordering::Equal,
        },
        other => other,
    }
}

/// Whether `candidate` satisfies `requested` under `policy`.
pub fn is_compatible(candidate: &Version, requested: &Version, policy: CompatibilityPolicy) -> bool {
    match policy.dimension() {
        Dimension::Exact => compare(candidate, requested) == Ordering::Equal,
        Dimension::Patch => {
            candidate.major == requested.major
                && candidate.minor == requested.minor
                && candidate.feature_band == requested.feature_band
                && candidate.patch.unwrap_or(0) >= requested.patch.unwrap_or(0)
        }
        Dimension::Feature => {
            candidate.major == requested.major
                && candidate.minor == requested.minor
                && (candidate.feature_band.unwrap_or(0), candidate.patch.unwrap_or(0))
                    >= (requested.feature_band.unwrap_or(0), requested.patch.unwrap_or(0))
        }
        Dimension::Minor => {
            candidate.major == requested.major
                && (
                    candidate.minor.unwrap_or(0),
                    candidate.feature_band.unwrap_or(0),
                    candidate.patch.unwrap_or(0),
                ) >= (
                    requested.minor.unwrap_or(0),
                    requested.feature_band.unwrap_or(0),
                    requested.patch.unwrap_or(0),
                )
        }
        Dimension::Major => {
            (
                candidate.major,
                candidate.minor.unwrap_or(0),
                candidate.feature_band.unwrap_or(0),
                candidate.patch.unwrap_or(0),
            ) >= (
                requested.major,
                requested.minor.unwrap_or(0),
                requested.feature_band.unwrap_or(0),
                requested.patch.unwrap_or(0),
            )
        }
    }
}

/// Filter `installed` to the subset compatible with `requested` under
/// `policy`, preserving input order.
pub fn filter_compatible<'a>(
    installed: &'a [Version],
    requested: &Version,
    policy: CompatibilityPolicy,
) -> Vec<&'a Version> {
    installed
        .iter()
        .filter(|candidate| is_compatible(candidate, requested, policy))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::parse;

    #[test]
    fn prerelease_orders_below_release() {
        let pre = parse("7.0.100-rc.1").unwrap();
        let rel = parse("7.0.100").unwrap();
        assert_eq!(compare(&pre, &rel), Ordering::Less);
    }

    #[test]
    fn patch_policy_requires_same_band() {
        let requested = parse("7.0.100").unwrap();
        let same_band_newer = parse("7.0.110").unwrap();
        let diff_band = parse("7.0.200").unwrap();
        assert!(is_compatible(&same_band_newer, &requested, CompatibilityPolicy::Patch));
        assert!(!is_compatible(&diff_band, &requested, CompatibilityPolicy::Patch));
    }

    #[test]
    fn disable_requires_exact_equality() {
        let requested = parse("7.0.100").unwrap();
        let newer = parse("7.0.101").unwrap();
        assert!(!is_compatible(&newer, &requested, CompatibilityPolicy::Disable));
        assert!(is_compatible(&requested, &requested, CompatibilityPolicy::Disable));
    }

    #[test]
    fn major_policy_allows_any_higher_component() {
        let requested = parse("6.0.100").unwrap();
        let newer_major = parse("7.0.100").unwrap();
        assert!(is_compatible(&newer_major, &requested, CompatibilityPolicy::Major));
        assert!(!is_compatible(&requested, &newer_major, CompatibilityPolicy::Major));
    }

    #[test]
    fn filter_preserves_order() {
        let requested = parse("7.0.100").unwrap();
        let versions = vec![
            parse("7.0.110").unwrap(),
            parse("6.0.100").unwrap(),
            parse("7.0.120").unwrap(),
        ];
        let filtered = filter_compatible(&versions, &requested, CompatibilityPolicy::Feature);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].to_string(), "7.0.110");
        assert_eq!(filtered[1].to_string(), "7.0.120");
    }

    #[test]
    fn compatibility_monotonic_in_relevant_dimension() {
        let requested = parse("7.0.100").unwrap();
        let x = parse("7.0.110").unwrap();
        let y = parse("7.0.120").unwrap();
        assert!(is_compatible(&x, &requested, CompatibilityPolicy::Patch));
        assert!(compare(&y, &x) != Ordering::Less);
        assert!(is_compatible(&y, &requested, CompatibilityPolicy::Patch));
    }
}
