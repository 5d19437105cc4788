//! Classification of declared dependency constraints
//!
//! Handles specifier forms:
//! - Ranges: `^1.2.3`, `~1.2`, `1.x`, `>=1.0.0 <2.0.0`, `1 - 2`, `*`
//! - The `latest` tag
//! - Git / URL / `file:` / `link:` / `workspace:` / `npm:` aliases
//! - Hosted shorthands: `github:user/repo`, `user/repo#ref`
//! - Other dist-tags: `next`, `beta`, `canary`

use crate::domain::{ConstraintKind, DependencyConstraint, NonSemverReason};
use crate::outdated::range::NpmRange;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static HOSTED_SHORTHAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][\w.-]*/[\w.-]+(?:#.*)?$").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z][\w.-]*$").unwrap());

const PREFIXES: [(&str, NonSemverReason); 14] = [
    ("git+", NonSemverReason::Git),
    ("git://", NonSemverReason::Git),
    ("git@", NonSemverReason::Git),
    ("http://", NonSemverReason::Url),
    ("https://", NonSemverReason::Url),
    ("file:", NonSemverReason::File),
    ("link:", NonSemverReason::Link),
    ("portal:", NonSemverReason::Link),
    ("workspace:", NonSemverReason::Workspace),
    ("npm:", NonSemverReason::Alias),
    ("github:", NonSemverReason::Hosted),
    ("gitlab:", NonSemverReason::Hosted),
    ("bitbucket:", NonSemverReason::Hosted),
    ("gist:", NonSemverReason::Hosted),
];

/// Classify a raw constraint string
pub fn classify_constraint(raw: &str) -> ConstraintKind {
    let trimmed = raw.trim();

    if trimmed == "latest" {
        return ConstraintKind::Latest;
    }

    for (prefix, reason) in PREFIXES {
        if trimmed.starts_with(prefix) {
            return ConstraintKind::NonSemver(reason);
        }
    }
    if trimmed.ends_with(".git") {
        return ConstraintKind::NonSemver(NonSemverReason::Git);
    }
    if trimmed.starts_with('.') || trimmed.starts_with('/') || trimmed.starts_with("~/") {
        return ConstraintKind::NonSemver(NonSemverReason::File);
    }

    if NpmRange::parse(trimmed).is_some() {
        return ConstraintKind::Range;
    }

    if HOSTED_SHORTHAND_RE.is_match(trimmed) {
        return ConstraintKind::NonSemver(NonSemverReason::Hosted);
    }
    if TAG_RE.is_match(trimmed) {
        return ConstraintKind::NonSemver(NonSemverReason::Tag);
    }

    ConstraintKind::NonSemver(NonSemverReason::Invalid)
}

/// Classify every entry of a name -> constraint map
pub fn classify_dependencies(constraints: &BTreeMap<String, String>) -> Vec<DependencyConstraint> {
    constraints
        .iter()
        .map(|(name, raw)| DependencyConstraint::new(name, raw, classify_constraint(raw)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_semver(raw: &str) -> Option<NonSemverReason> {
        match classify_constraint(raw) {
            ConstraintKind::NonSemver(reason) => Some(reason),
            _ => None,
        }
    }

    #[test]
    fn test_ranges() {
        for raw in [
            "^1.2.3",
            "~1.2.3",
            ">=1.0.0",
            ">=1.0.0 <2.0.0",
            "1.2.3",
            "1.x",
            "*",
            "",
            "1.0.0 - 2.0.0",
            "^1.0.0 || ^2.0.0",
            "^2.0.0-rc",
        ] {
            assert_eq!(classify_constraint(raw), ConstraintKind::Range, "{:?}", raw);
        }
    }

    #[test]
    fn test_latest() {
        assert_eq!(classify_constraint("latest"), ConstraintKind::Latest);
        assert_eq!(classify_constraint(" latest "), ConstraintKind::Latest);
    }

    #[test]
    fn test_git() {
        assert_eq!(
            non_semver("git+https://github.com/user/repo.git"),
            Some(NonSemverReason::Git)
        );
        assert_eq!(
            non_semver("git://github.com/user/repo.git#v1.0.0"),
            Some(NonSemverReason::Git)
        );
        assert_eq!(
            non_semver("git@github.com:user/repo.git"),
            Some(NonSemverReason::Git)
        );
    }

    #[test]
    fn test_url() {
        assert_eq!(
            non_semver("https://example.com/pkg-1.0.0.tgz"),
            Some(NonSemverReason::Url)
        );
    }

    #[test]
    fn test_local_paths() {
        assert_eq!(non_semver("file:../local"), Some(NonSemverReason::File));
        assert_eq!(non_semver("../sibling"), Some(NonSemverReason::File));
        assert_eq!(non_semver("./vendor/pkg"), Some(NonSemverReason::File));
        assert_eq!(non_semver("link:../linked"), Some(NonSemverReason::Link));
    }

    #[test]
    fn test_workspace_and_alias() {
        assert_eq!(non_semver("workspace:*"), Some(NonSemverReason::Workspace));
        assert_eq!(non_semver("workspace:^1.0.0"), Some(NonSemverReason::Workspace));
        assert_eq!(non_semver("npm:string-width@^4.2.0"), Some(NonSemverReason::Alias));
    }

    #[test]
    fn test_hosted() {
        assert_eq!(non_semver("github:user/repo"), Some(NonSemverReason::Hosted));
        assert_eq!(non_semver("user/repo"), Some(NonSemverReason::Hosted));
        assert_eq!(non_semver("user/repo#main"), Some(NonSemverReason::Hosted));
    }

    #[test]
    fn test_tags() {
        assert_eq!(non_semver("next"), Some(NonSemverReason::Tag));
        assert_eq!(non_semver("beta"), Some(NonSemverReason::Tag));
        assert_eq!(non_semver("canary-2024"), Some(NonSemverReason::Tag));
    }

    #[test]
    fn test_invalid() {
        assert_eq!(non_semver(">>1.0"), Some(NonSemverReason::Invalid));
        assert_eq!(non_semver("1.2.3.4"), Some(NonSemverReason::Invalid));
    }

    #[test]
    fn test_classify_dependencies() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), "^1.0.0".to_string());
        map.insert("b".to_string(), "git+https://x/y.git".to_string());
        map.insert("c".to_string(), "latest".to_string());

        let classified = classify_dependencies(&map);
        assert_eq!(classified.len(), 3);
        assert!(classified[0].is_evaluable());
        assert!(!classified[1].is_evaluable());
        assert_eq!(classified[2].kind, ConstraintKind::Latest);
    }
}
