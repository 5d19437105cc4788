//! Registry access for package metadata
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - npm registry adapter (manifests, version lists, companion lookups)
//! - `VersionSource`, the bulk version lookup consumed by the outdated
//!   aggregator

mod client;
mod npm;

pub use client::{HttpClient, RetryPolicy};
pub use npm::{select_version, NpmRegistry, ResolvedManifest, DEFAULT_CONCURRENCY};

use crate::domain::PackageVersionsInfo;
use crate::error::RegistryError;
use async_trait::async_trait;

/// Outcome of one name in a bulk version lookup
#[derive(Debug, Clone, PartialEq)]
pub enum VersionsEntry {
    /// Version metadata was fetched
    Found(PackageVersionsInfo),
    /// The lookup for this name failed; the rest of the batch is unaffected
    Failed { name: String, message: String },
}

impl VersionsEntry {
    /// Name of the package this entry describes
    pub fn name(&self) -> &str {
        match self {
            VersionsEntry::Found(info) => &info.name,
            VersionsEntry::Failed { name, .. } => name,
        }
    }
}

/// Source of published versions for many packages at once
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Fetch version metadata for every name in `names`
    ///
    /// Per-name failures are reported as `VersionsEntry::Failed`. An `Err`
    /// means the batch as a whole could not be served.
    async fn fetch_versions_batch(
        &self,
        names: &[String],
    ) -> Result<Vec<VersionsEntry>, RegistryError>;
}
