//! Binary-only (CLI artifact) classification and `create-*` naming

use crate::domain::PackageManifest;

const CREATE_PREFIX: &str = "create-";

/// Returns true if the name follows the `create-*` scaffolder convention
pub fn is_create_package_name(name: &str) -> bool {
    name.starts_with(CREATE_PREFIX) || name.contains("/create-")
}

/// Returns true if the package is a CLI with nothing to import
pub fn is_binary_only(manifest: &PackageManifest) -> bool {
    if is_create_package_name(&manifest.name) {
        return true;
    }

    let has_bin = manifest.bin.as_ref().is_some_and(|bin| !bin.is_empty());
    let has_entry_point =
        manifest.main.is_some() || manifest.module.is_some() || manifest.exports.is_some();

    has_bin && !has_entry_point
}

/// `vite` -> `create-vite`, `@nuxt/app` -> `@nuxt/create-app`
pub fn create_package_name(name: &str) -> String {
    match name.split_once('/') {
        Some((scope, pkg)) if scope.starts_with('@') => {
            format!("{}/{}{}", scope, CREATE_PREFIX, pkg)
        }
        _ => format!("{}{}", CREATE_PREFIX, name),
    }
}

/// Inverse of [`create_package_name`]
///
/// Names without the `create-` prefix are returned unchanged.
pub fn create_short_name(create_name: &str) -> String {
    match create_name.split_once('/') {
        Some((scope, pkg)) if scope.starts_with('@') => match pkg.strip_prefix(CREATE_PREFIX) {
            Some(short) => format!("{}/{}", scope, short),
            None => create_name.to_string(),
        },
        _ => create_name
            .strip_prefix(CREATE_PREFIX)
            .unwrap_or(create_name)
            .to_string(),
    }
}
