//! Version metadata and outdated-dependency records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Published versions and dist-tags of one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageVersionsInfo {
    pub name: String,
    pub versions: Vec<String>,
    pub dist_tags: BTreeMap<String, String>,
}

impl PackageVersionsInfo {
    /// Create a new PackageVersionsInfo
    pub fn new(
        name: impl Into<String>,
        versions: Vec<String>,
        dist_tags: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            versions,
            dist_tags,
        }
    }

    /// The version the `latest` dist-tag points at
    pub fn latest(&self) -> Option<&str> {
        self.dist_tags.get("latest").map(String::as_str)
    }
}

/// Which semver component differs between two versions
///
/// Mirrors the classification npm's `semver.diff` produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffType {
    Major,
    Premajor,
    Minor,
    Preminor,
    Patch,
    Prepatch,
    Prerelease,
}

impl DiffType {
    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            DiffType::Major => "major",
            DiffType::Premajor => "premajor",
            DiffType::Minor => "minor",
            DiffType::Preminor => "preminor",
            DiffType::Patch => "patch",
            DiffType::Prepatch => "prepatch",
            DiffType::Prerelease => "prerelease",
        }
    }
}

impl fmt::Display for DiffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How far a dependency's resolvable version trails `latest`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutdatedDependencyInfo {
    /// Highest version the declared constraint allows
    pub resolved: String,
    pub latest: String,
    pub majors_behind: u64,
    /// Only meaningful when `majors_behind` is 0
    pub minors_behind: u64,
    pub diff_type: Option<DiffType>,
}

impl OutdatedDependencyInfo {
    /// Record for a dependency pinned to the `latest` tag
    pub fn tracking_latest(latest: impl Into<String>) -> Self {
        let latest = latest.into();
        Self {
            resolved: latest.clone(),
            latest,
            majors_behind: 0,
            minors_behind: 0,
            diff_type: None,
        }
    }

    /// Returns true if the resolved version actually trails latest
    pub fn is_behind(&self) -> bool {
        self.diff_type.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_dist_tag() {
        let mut tags = BTreeMap::new();
        tags.insert("latest".to_string(), "1.5.0".to_string());
        tags.insert("next".to_string(), "2.0.0-rc.1".to_string());
        let info = PackageVersionsInfo::new("a", vec!["1.5.0".to_string()], tags);
        assert_eq!(info.latest(), Some("1.5.0"));

        let info = PackageVersionsInfo::new("b", vec![], BTreeMap::new());
        assert_eq!(info.latest(), None);
    }

    #[test]
    fn test_versions_info_serde_camel_case() {
        let json = r#"{"name":"a","versions":["1.0.0"],"distTags":{"latest":"1.0.0"}}"#;
        let info: PackageVersionsInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.latest(), Some("1.0.0"));
    }

    #[test]
    fn test_tracking_latest() {
        let info = OutdatedDependencyInfo::tracking_latest("2.0.0");
        assert_eq!(info.resolved, "2.0.0");
        assert_eq!(info.latest, "2.0.0");
        assert_eq!(info.majors_behind, 0);
        assert_eq!(info.minors_behind, 0);
        assert!(!info.is_behind());
    }

    #[test]
    fn test_outdated_serde() {
        let info = OutdatedDependencyInfo {
            resolved: "1.2.0".to_string(),
            latest: "2.0.0".to_string(),
            majors_behind: 1,
            minors_behind: 0,
            diff_type: Some(DiffType::Major),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["majorsBehind"], 1);
        assert_eq!(json["diffType"], "major");

        let json = serde_json::to_value(OutdatedDependencyInfo::tracking_latest("1.0.0")).unwrap();
        assert!(json["diffType"].is_null());
    }

    #[test]
    fn test_diff_type_display() {
        assert_eq!(DiffType::Preminor.to_string(), "preminor");
    }
}
