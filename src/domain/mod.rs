//! Core domain models for pkglens
//!
//! This module contains the fundamental types used throughout the crate:
//! - Package manifests and the recursive `exports` map
//! - Derived facts: module format, types status, companion packages
//! - Declared dependency constraints and their classification
//! - Version metadata and outdated-dependency records

mod constraint;
mod format;
mod manifest;
mod versions;

pub use constraint::{ConstraintKind, DependencyConstraint, NonSemverReason};
pub use format::{
    ExportsAnalysis, ModuleFormat, PackageAnalysis, RelatedPackageInfo, TypesStatus,
};
pub use manifest::{Bin, DependencySection, ExportsMap, PackageManifest};
pub use versions::{DiffType, OutdatedDependencyInfo, PackageVersionsInfo};
