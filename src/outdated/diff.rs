//! Semver difference classification
//!
//! Follows npm's `semver.diff`: the result names the highest component
//! that changed, prefixed with `pre` when the higher version is itself a
//! prerelease. Moving from a prerelease to its release is special-cased.

use crate::domain::DiffType;
use semver::Version;
use std::cmp::Ordering;

/// Classify the difference between two versions
///
/// Returns `None` if both versions have the same precedence.
pub fn semver_diff(a: &Version, b: &Version) -> Option<DiffType> {
    let ordering = precedence(a, b);
    if ordering == Ordering::Equal {
        return None;
    }

    let (high, low) = if ordering == Ordering::Greater {
        (a, b)
    } else {
        (b, a)
    };
    let high_has_pre = !high.pre.is_empty();
    let low_has_pre = !low.pre.is_empty();

    if low_has_pre && !high_has_pre {
        // 1.0.0-1 -> anything released is a major step
        if low.patch == 0 && low.minor == 0 {
            return Some(DiffType::Major);
        }
        if (low.major, low.minor, low.patch) == (high.major, high.minor, high.patch) {
            if low.minor != 0 && low.patch == 0 {
                return Some(DiffType::Minor);
            }
            return Some(DiffType::Patch);
        }
    }

    let kind = if a.major != b.major {
        if high_has_pre {
            DiffType::Premajor
        } else {
            DiffType::Major
        }
    } else if a.minor != b.minor {
        if high_has_pre {
            DiffType::Preminor
        } else {
            DiffType::Minor
        }
    } else if a.patch != b.patch {
        if high_has_pre {
            DiffType::Prepatch
        } else {
            DiffType::Patch
        }
    } else {
        DiffType::Prerelease
    };
    Some(kind)
}

/// Compare by semver precedence, ignoring build metadata
fn precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}
