//! Depth-bounded walk over a manifest's `exports` map

use crate::domain::{ExportsAnalysis, ExportsMap};

/// Deepest nesting level the walker descends into
///
/// Real-world `exports` maps rarely go past three or four levels; nodes
/// deeper than this contribute nothing.
pub const MAX_EXPORTS_DEPTH: usize = 10;

/// Collect import/require/module/types signals from an `exports` map
pub fn analyze_exports(exports: Option<&ExportsMap>) -> ExportsAnalysis {
    analyze_exports_with_depth_limit(exports, MAX_EXPORTS_DEPTH)
}

/// Same as [`analyze_exports`] with a caller-chosen depth cap
pub fn analyze_exports_with_depth_limit(
    exports: Option<&ExportsMap>,
    max_depth: usize,
) -> ExportsAnalysis {
    match exports {
        Some(map) => walk(map, 0, max_depth),
        None => ExportsAnalysis::default(),
    }
}

fn walk(node: &ExportsMap, depth: usize, max_depth: usize) -> ExportsAnalysis {
    if depth > max_depth {
        return ExportsAnalysis::default();
    }

    match node {
        ExportsMap::Null => ExportsAnalysis::default(),
        ExportsMap::Path(path) => analyze_path(path),
        ExportsMap::List(entries) => entries
            .iter()
            .fold(ExportsAnalysis::default(), |acc, entry| {
                acc | walk(entry, depth + 1, max_depth)
            }),
        ExportsMap::Conditions(conditions) => {
            let mut result = ExportsAnalysis::default();
            for (key, value) in conditions {
                match key.as_str() {
                    "import" => result.has_import = true,
                    "require" => result.has_require = true,
                    "module" => result.has_module = true,
                    "types" => result.has_types = true,
                    _ => {}
                }
                result |= walk(value, depth + 1, max_depth);
            }
            result
        }
    }
}

/// Classify a single export target by its file extension
///
/// `.json` counts as an ESM signal; registry data shows JSON-only exports
/// almost exclusively in ESM packages.
fn analyze_path(path: &str) -> ExportsAnalysis {
    let mut result = ExportsAnalysis::default();

    if path.ends_with(".d.ts") || path.ends_with(".d.mts") || path.ends_with(".d.cts") {
        result.has_types = true;
    }
    if path.ends_with(".mjs") || path.ends_with(".mts") || path.ends_with(".json") {
        result.has_import = true;
    }
    if path.ends_with(".cjs") || path.ends_with(".cts") {
        result.has_require = true;
    }

    result
}
