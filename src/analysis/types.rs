//! TypeScript declaration availability

use crate::analysis::exports::analyze_exports;
use crate::domain::{PackageManifest, RelatedPackageInfo, TypesStatus};

/// Returns true if the package ships its own declarations
///
/// Checks `types` / `typings` and then the `exports` map. Companion
/// `@types/*` packages are not considered.
pub fn has_built_in_types(manifest: &PackageManifest) -> bool {
    if manifest.types.is_some() || manifest.typings.is_some() {
        return true;
    }
    manifest.exports.is_some() && analyze_exports(manifest.exports.as_ref()).has_types
}

/// Determine where a package's declarations come from
///
/// `types_package` is the caller's lookup of the `@types/*` companion; this
/// function never queries the registry itself.
pub fn detect_types_status(
    manifest: &PackageManifest,
    types_package: Option<&RelatedPackageInfo>,
) -> TypesStatus {
    if has_built_in_types(manifest) {
        return TypesStatus::Included;
    }

    match types_package {
        Some(info) => TypesStatus::TypesPackage(info.clone()),
        None => TypesStatus::None,
    }
}

/// Name of the DefinitelyTyped companion for a package
///
/// `foo` maps to `@types/foo`, `@scope/name` to `@types/scope__name`.
pub fn types_package_name(name: &str) -> String {
    match name.strip_prefix('@').and_then(|rest| rest.split_once('/')) {
        Some((scope, pkg)) => format!("@types/{}__{}", scope, pkg),
        None => format!("@types/{}", name),
    }
}
