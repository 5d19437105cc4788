//! Version constraint resolution against a published version list

use crate::domain::OutdatedDependencyInfo;
use crate::outdated::diff::semver_diff;
use crate::outdated::range::NpmRange;
use regex::Regex;
use semver::Version;
use std::sync::LazyLock;

static PRERELEASE_INTENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)alpha|beta|rc|next|canary|dev|preview|pre|experimental|-\d").unwrap()
});

/// Returns true if the constraint opts into prerelease versions
pub fn signals_prerelease(constraint: &str) -> bool {
    PRERELEASE_INTENT_RE.is_match(constraint)
}

/// Parse the published versions a constraint may resolve to
///
/// Prereleases are dropped unless the constraint itself asks for them, so
/// `^1.0.0` never lands on `1.1.0-beta.1`. Unparseable versions are skipped.
pub fn candidate_versions(published: &[String], constraint: &str) -> Vec<Version> {
    let include_prerelease = signals_prerelease(constraint);
    published
        .iter()
        .filter_map(|v| Version::parse(v.trim()).ok())
        .filter(|v| include_prerelease || v.pre.is_empty())
        .collect()
}

/// Determine whether a constraint trails the `latest` dist-tag
///
/// Returns `None` when nothing satisfies the constraint, when the resolved
/// version already is latest, or when it is ahead of latest.
pub fn resolve_outdated(
    published: &[String],
    latest_tag: &str,
    constraint: &str,
) -> Option<OutdatedDependencyInfo> {
    if constraint.trim() == "latest" {
        return Some(OutdatedDependencyInfo::tracking_latest(latest_tag));
    }

    let range = NpmRange::parse(constraint)?;
    let candidates = candidate_versions(published, constraint);
    let resolved = range.max_satisfying(&candidates)?;
    let latest = Version::parse(latest_tag.trim()).ok()?;

    if *resolved >= latest {
        return None;
    }

    let majors_behind = latest.major - resolved.major;
    let minors_behind = if majors_behind == 0 {
        latest.minor.saturating_sub(resolved.minor)
    } else {
        0
    };

    Some(OutdatedDependencyInfo {
        resolved: resolved.to_string(),
        latest: latest.to_string(),
        majors_behind,
        minors_behind,
        diff_type: semver_diff(resolved, &latest),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DiffType;

    fn versions(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_latest_constraint_is_never_outdated() {
        let info = resolve_outdated(&versions(&["1.0.0", "1.2.0", "2.0.0"]), "2.0.0", "latest")
            .unwrap();
        assert_eq!(info, OutdatedDependencyInfo::tracking_latest("2.0.0"));
        assert_eq!(info.diff_type, None);
    }

    #[test]
    fn test_major_behind() {
        let info = resolve_outdated(&versions(&["1.0.0", "1.2.0", "2.0.0"]), "2.0.0", "^1.0.0")
            .unwrap();
        assert_eq!(info.resolved, "1.2.0");
        assert_eq!(info.latest, "2.0.0");
        assert_eq!(info.majors_behind, 1);
        assert_eq!(info.minors_behind, 0);
        assert_eq!(info.diff_type, Some(DiffType::Major));
    }

    #[test]
    fn test_minors_behind_within_same_major() {
        let info = resolve_outdated(&versions(&["1.0.0", "1.2.3", "1.5.0"]), "1.5.0", "~1.2.0")
            .unwrap();
        assert_eq!(info.resolved, "1.2.3");
        assert_eq!(info.majors_behind, 0);
        assert_eq!(info.minors_behind, 3);
        assert_eq!(info.diff_type, Some(DiffType::Minor));
    }

    #[test]
    fn test_minors_not_counted_across_majors() {
        let info =
            resolve_outdated(&versions(&["1.9.0", "3.1.0"]), "3.1.0", "^1.0.0").unwrap();
        assert_eq!(info.majors_behind, 2);
        assert_eq!(info.minors_behind, 0);
    }

    #[test]
    fn test_patch_behind() {
        let info = resolve_outdated(&versions(&["1.2.3", "1.2.4"]), "1.2.4", "1.2.3").unwrap();
        assert_eq!(info.diff_type, Some(DiffType::Patch));
        assert_eq!(info.minors_behind, 0);
    }

    #[test]
    fn test_resolved_equals_latest() {
        assert_eq!(
            resolve_outdated(&versions(&["1.0.0", "2.0.0"]), "2.0.0", "^2.0.0"),
            None
        );
    }

    #[test]
    fn test_resolved_ahead_of_latest() {
        assert_eq!(
            resolve_outdated(&versions(&["1.0.0", "2.0.0-rc.1"]), "1.0.0", "^2.0.0-rc"),
            None
        );
    }

    #[test]
    fn test_no_satisfying_version() {
        assert_eq!(resolve_outdated(&[], "x", "^1.0.0"), None);
        assert_eq!(
            resolve_outdated(&versions(&["3.0.0", "3.1.0"]), "3.1.0", "^2.0.0"),
            None
        );
    }

    #[test]
    fn test_prerelease_excluded_without_intent() {
        let published = versions(&["1.0.0", "1.1.0-beta.1", "2.0.0"]);
        let info = resolve_outdated(&published, "2.0.0", ">=1.0.0 <2.0.0").unwrap();
        assert_eq!(info.resolved, "1.0.0");
    }

    #[test]
    fn test_prerelease_included_with_intent() {
        let published = versions(&["1.0.0-beta.1", "1.0.0-beta.3", "1.0.0", "2.0.0"]);
        let info = resolve_outdated(&published, "2.0.0", "~1.0.0-beta.1").unwrap();
        // The released 1.0.0 outranks every beta on the same line
        assert_eq!(info.resolved, "1.0.0");

        let published = versions(&["1.0.0-beta.1", "1.0.0-beta.3", "2.0.0"]);
        let info = resolve_outdated(&published, "2.0.0", "~1.0.0-beta.1").unwrap();
        assert_eq!(info.resolved, "1.0.0-beta.3");
        assert_eq!(info.majors_behind, 1);
    }

    #[test]
    fn test_non_range_constraint() {
        assert_eq!(
            resolve_outdated(&versions(&["1.0.0"]), "1.0.0", "git+https://x/y.git"),
            None
        );
    }

    #[test]
    fn test_unparseable_versions_skipped() {
        let published = versions(&["not-a-version", "1.0.0", "1.1.0", "2.0.0"]);
        let info = resolve_outdated(&published, "2.0.0", "^1.0.0").unwrap();
        assert_eq!(info.resolved, "1.1.0");
    }

    #[test]
    fn test_signals_prerelease() {
        assert!(signals_prerelease("^2.0.0-rc"));
        assert!(signals_prerelease("^2.0.0-BETA.1"));
        assert!(signals_prerelease("1.0.0-0"));
        assert!(!signals_prerelease("^1.0.0"));
        assert!(!signals_prerelease(">=1.0.0 <2.0.0"));
    }

    #[test]
    fn test_candidate_versions_filters_prereleases() {
        let published = versions(&["1.0.0", "1.1.0-alpha", "1.1.0"]);
        assert_eq!(candidate_versions(&published, "^1.0.0").len(), 2);
        assert_eq!(candidate_versions(&published, "^1.1.0-alpha").len(), 3);
    }
}
