//! Declared dependency constraints
//!
//! A manifest maps dependency names to free-form specifiers. Only some of
//! them are semver ranges that can be evaluated against a version list:
//! - Range: `^1.2.3`, `~1.2`, `>=1.0.0 <2.0.0`, `1.x || 2.x`
//! - Latest: the literal dist-tag `latest`
//! - Everything else (git URLs, `workspace:*`, `file:` paths, aliases, tags)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a constraint cannot be evaluated against a version list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonSemverReason {
    /// `git+https://...`, `git@host:repo.git`
    Git,
    /// Tarball URL
    Url,
    /// `file:../local`
    File,
    /// `link:` / `portal:`
    Link,
    /// `workspace:*`
    Workspace,
    /// `npm:other-package@^1.0.0`
    Alias,
    /// `github:user/repo` or `user/repo` shorthand
    Hosted,
    /// A dist-tag other than `latest` (e.g., `next`, `beta`)
    Tag,
    /// Anything unparseable
    Invalid,
}

impl NonSemverReason {
    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            NonSemverReason::Git => "git",
            NonSemverReason::Url => "url",
            NonSemverReason::File => "file",
            NonSemverReason::Link => "link",
            NonSemverReason::Workspace => "workspace",
            NonSemverReason::Alias => "alias",
            NonSemverReason::Hosted => "hosted",
            NonSemverReason::Tag => "tag",
            NonSemverReason::Invalid => "invalid",
        }
    }
}

impl fmt::Display for NonSemverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classification of a raw constraint string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "reason")]
pub enum ConstraintKind {
    /// A semver range in npm's dialect
    Range,
    /// The literal `latest` tag
    Latest,
    /// Not evaluable against published versions
    NonSemver(NonSemverReason),
}

impl ConstraintKind {
    /// Returns true if outdated analysis can evaluate this constraint
    pub fn is_evaluable(&self) -> bool {
        matches!(self, ConstraintKind::Range | ConstraintKind::Latest)
    }
}

/// A dependency name with its declared constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyConstraint {
    pub name: String,
    /// The constraint exactly as declared
    pub raw: String,
    pub kind: ConstraintKind,
}

impl DependencyConstraint {
    /// Creates a new DependencyConstraint
    pub fn new(name: impl Into<String>, raw: impl Into<String>, kind: ConstraintKind) -> Self {
        Self {
            name: name.into(),
            raw: raw.into(),
            kind,
        }
    }

    /// Returns true if outdated analysis can evaluate this dependency
    pub fn is_evaluable(&self) -> bool {
        self.kind.is_evaluable()
    }
}

impl fmt::Display for DependencyConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_kind_is_evaluable() {
        assert!(ConstraintKind::Range.is_evaluable());
        assert!(ConstraintKind::Latest.is_evaluable());
        assert!(!ConstraintKind::NonSemver(NonSemverReason::Git).is_evaluable());
        assert!(!ConstraintKind::NonSemver(NonSemverReason::Tag).is_evaluable());
    }

    #[test]
    fn test_display() {
        let dep = DependencyConstraint::new("lodash", "^4.17.21", ConstraintKind::Range);
        assert_eq!(dep.to_string(), "lodash@^4.17.21");
    }

    #[test]
    fn test_serde_constraint_kind() {
        let kind = ConstraintKind::NonSemver(NonSemverReason::Workspace);
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, r#"{"kind":"non_semver","reason":"workspace"}"#);

        let parsed: ConstraintKind = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, kind);

        let json = serde_json::to_string(&ConstraintKind::Range).unwrap();
        assert_eq!(json, r#"{"kind":"range"}"#);
    }
}
