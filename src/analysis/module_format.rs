//! Module format detection (ESM / CJS / dual)
//!
//! `exports` conditions win when they carry a signal; otherwise the legacy
//! `main` / `module` / `type` fields decide. A manifest with no `type`
//! field is CommonJS, matching npm's default.

use crate::analysis::exports::analyze_exports;
use crate::domain::{ModuleFormat, PackageManifest};

/// Classify the module system a package ships
pub fn detect_module_format(manifest: &PackageManifest) -> ModuleFormat {
    if manifest.exports.is_some() {
        let analysis = analyze_exports(manifest.exports.as_ref());

        if analysis.has_import && analysis.has_require {
            return ModuleFormat::Dual;
        }

        if analysis.has_import || analysis.has_module {
            // ESM conditions next to a main that node would load as CJS
            if manifest.main.is_some() && !manifest.is_type_module() {
                return ModuleFormat::Dual;
            }
            return ModuleFormat::Esm;
        }

        if analysis.has_require {
            if manifest.module.is_some() {
                return ModuleFormat::Dual;
            }
            return ModuleFormat::Cjs;
        }
    }

    detect_legacy_format(manifest)
}

fn detect_legacy_format(manifest: &PackageManifest) -> ModuleFormat {
    let type_module = manifest.is_type_module();

    if manifest.module.is_some() {
        return match manifest.main.as_deref() {
            // Only a `.js` main that `type: module` makes ESM collapses
            Some(main) if !(type_module && main.ends_with(".js")) => ModuleFormat::Dual,
            _ => ModuleFormat::Esm,
        };
    }

    if type_module {
        return ModuleFormat::Esm;
    }

    match manifest.module_type.as_deref() {
        None | Some("commonjs") => ModuleFormat::Cjs,
        Some(_) if manifest.main.is_some() => ModuleFormat::Cjs,
        Some(_) => ModuleFormat::Unknown,
    }
}
