//! Derived facts about a package: module format, bundled types, companions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Signals collected while walking an `exports` map
///
/// Each flag is the logical OR over every visited node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportsAnalysis {
    pub has_import: bool,
    pub has_require: bool,
    pub has_module: bool,
    pub has_types: bool,
}

impl ExportsAnalysis {
    /// Returns true if the walk found an import, require, or module signal
    pub fn has_format_signal(&self) -> bool {
        self.has_import || self.has_require || self.has_module
    }
}

impl BitOr for ExportsAnalysis {
    type Output = ExportsAnalysis;

    fn bitor(self, rhs: Self) -> Self::Output {
        ExportsAnalysis {
            has_import: self.has_import || rhs.has_import,
            has_require: self.has_require || rhs.has_require,
            has_module: self.has_module || rhs.has_module,
            has_types: self.has_types || rhs.has_types,
        }
    }
}

impl BitOrAssign for ExportsAnalysis {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

/// Module system a package ships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
    /// ES modules only
    Esm,
    /// CommonJS only
    Cjs,
    /// Both ESM and CommonJS entry points
    Dual,
    Unknown,
}

impl ModuleFormat {
    /// Short label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            ModuleFormat::Esm => "ESM",
            ModuleFormat::Cjs => "CJS",
            ModuleFormat::Dual => "ESM + CJS",
            ModuleFormat::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ModuleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModuleFormat::Esm => "esm",
            ModuleFormat::Cjs => "cjs",
            ModuleFormat::Dual => "dual",
            ModuleFormat::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// A companion package (`@types/*` or `create-*`) of the analyzed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedPackageInfo {
    pub package_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

impl RelatedPackageInfo {
    /// Create info for a companion package that is not deprecated
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            deprecated: None,
        }
    }

    /// Attach a deprecation message
    pub fn with_deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecated = Some(message.into());
        self
    }
}

/// Where a package's TypeScript declarations come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TypesStatus {
    /// The package ships its own declarations
    #[serde(rename = "included")]
    Included,
    /// Declarations live in a companion `@types/*` package
    #[serde(rename = "@types")]
    TypesPackage(RelatedPackageInfo),
    /// No declarations available
    #[serde(rename = "none")]
    None,
}

impl TypesStatus {
    /// Returns true if any type declarations are available
    pub fn has_types(&self) -> bool {
        !matches!(self, TypesStatus::None)
    }
}

/// Combined analysis record for one manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageAnalysis {
    pub module_format: ModuleFormat,
    pub types: TypesStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engines: Option<BTreeMap<String, String>>,
    /// CLI-only package with no importable entry point
    pub binary_only: bool,
    /// The `create-*` scaffolder for this package, if one exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_package: Option<RelatedPackageInfo>,
}
