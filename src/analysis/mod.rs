//! Manifest analysis
//!
//! This module provides:
//! - A depth-bounded walker over the `exports` map
//! - Module format detection (ESM / CJS / dual)
//! - Types status detection (bundled, `@types/*`, none)
//! - Binary-only classification and `create-*` naming helpers
//!
//! Every function here is pure; results are recomputed on each call.

mod binary;
mod exports;
mod module_format;
mod types;

pub use binary::{create_package_name, create_short_name, is_binary_only, is_create_package_name};
pub use exports::{analyze_exports, analyze_exports_with_depth_limit, MAX_EXPORTS_DEPTH};
pub use module_format::detect_module_format;
pub use types::{detect_types_status, has_built_in_types, types_package_name};

use crate::domain::{PackageAnalysis, PackageManifest, RelatedPackageInfo};

/// Companion packages looked up by the caller
#[derive(Debug, Clone, Default)]
pub struct Companions {
    /// The `@types/*` package, if one is published
    pub types_package: Option<RelatedPackageInfo>,
    /// The `create-*` package, if one is published
    pub create_package: Option<RelatedPackageInfo>,
}

/// Merge every detector into one analysis record
pub fn analyze_package(manifest: &PackageManifest, companions: &Companions) -> PackageAnalysis {
    // A create-* package has no create-* companion of its own
    let create_package = if is_create_package_name(&manifest.name) {
        None
    } else {
        companions.create_package.clone()
    };

    PackageAnalysis {
        module_format: detect_module_format(manifest),
        types: detect_types_status(manifest, companions.types_package.as_ref()),
        engines: manifest.engines.clone(),
        binary_only: is_binary_only(manifest),
        create_package,
    }
}
