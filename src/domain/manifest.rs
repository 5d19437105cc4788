//! `package.json`-shaped manifest as published to the npm registry
//!
//! Only the fields needed for analysis are modelled. Registry data is
//! messy for old packages, so `engines` and the dependency maps are read
//! leniently: anything that is not an object of strings is dropped.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The `exports` field of a manifest
///
/// npm allows a bare path, an ordered list of fallbacks, or a (possibly
/// nested) map of condition keys / subpaths. `null` is valid inside a map
/// and blocks a subpath.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExportsMap {
    /// `null`
    Null,
    /// A file path (e.g., `./dist/index.mjs`)
    Path(String),
    /// Fallback list, tried in order
    List(Vec<ExportsMap>),
    /// Condition keys (`import`, `require`, `types`, ...) or subpaths (`.`)
    Conditions(BTreeMap<String, ExportsMap>),
}

impl ExportsMap {
    /// Convenience constructor for a path leaf
    pub fn path(path: impl Into<String>) -> Self {
        ExportsMap::Path(path.into())
    }

    /// Convenience constructor for a conditions map
    pub fn conditions<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ExportsMap)>,
    {
        ExportsMap::Conditions(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// The `bin` field: a single executable or a map of command name to path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bin {
    Path(String),
    Commands(BTreeMap<String, String>),
}

impl Bin {
    /// Returns true if no executable is actually declared
    pub fn is_empty(&self) -> bool {
        match self {
            Bin::Path(path) => path.trim().is_empty(),
            Bin::Commands(commands) => commands.is_empty(),
        }
    }
}

/// Dependency sections of a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencySection {
    Dependencies,
    DevDependencies,
    PeerDependencies,
    OptionalDependencies,
}

impl DependencySection {
    /// All sections in manifest order
    pub const ALL: [DependencySection; 4] = [
        DependencySection::Dependencies,
        DependencySection::DevDependencies,
        DependencySection::PeerDependencies,
        DependencySection::OptionalDependencies,
    ];

    /// The JSON key of this section
    pub fn key(&self) -> &'static str {
        match self {
            DependencySection::Dependencies => "dependencies",
            DependencySection::DevDependencies => "devDependencies",
            DependencySection::PeerDependencies => "peerDependencies",
            DependencySection::OptionalDependencies => "optionalDependencies",
        }
    }
}

impl fmt::Display for DependencySection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A package manifest (the `package.json` of one published version)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    /// Package name, possibly scoped (`@scope/name`)
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// The `type` field (`module` or `commonjs`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub module_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<ExportsMap>,
    #[serde(
        default,
        deserialize_with = "lenient_string_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub engines: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<Bin>,
    #[serde(
        default,
        deserialize_with = "lenient_string_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub dependencies: Option<BTreeMap<String, String>>,
    #[serde(
        default,
        deserialize_with = "lenient_string_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub dev_dependencies: Option<BTreeMap<String, String>>,
    #[serde(
        default,
        deserialize_with = "lenient_string_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub peer_dependencies: Option<BTreeMap<String, String>>,
    #[serde(
        default,
        deserialize_with = "lenient_string_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub optional_dependencies: Option<BTreeMap<String, String>>,
    /// Deprecation message, set by `npm deprecate`
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub deprecated: Option<String>,
}

impl PackageManifest {
    /// Create a manifest with just a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse a manifest from JSON text
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Returns true if `type` is `"module"`
    pub fn is_type_module(&self) -> bool {
        self.module_type.as_deref() == Some("module")
    }

    /// Get the dependency map of one section
    pub fn section(&self, section: DependencySection) -> Option<&BTreeMap<String, String>> {
        match section {
            DependencySection::Dependencies => self.dependencies.as_ref(),
            DependencySection::DevDependencies => self.dev_dependencies.as_ref(),
            DependencySection::PeerDependencies => self.peer_dependencies.as_ref(),
            DependencySection::OptionalDependencies => self.optional_dependencies.as_ref(),
        }
    }

    /// Merge the given sections into one name -> constraint map
    ///
    /// When a name appears in several sections the first section listed wins.
    pub fn dependency_constraints(
        &self,
        sections: &[DependencySection],
    ) -> BTreeMap<String, String> {
        let mut merged = BTreeMap::new();
        for section in sections {
            if let Some(deps) = self.section(*section) {
                for (name, constraint) in deps {
                    merged
                        .entry(name.clone())
                        .or_insert_with(|| constraint.clone());
                }
            }
        }
        merged
    }
}

fn lenient_string_map<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Object(map)) => Some(
            map.into_iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
                .collect(),
        ),
        _ => None,
    })
}

// `deprecated` is occasionally published as `false`
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}
