//! Outdated dependency analysis
//!
//! This module provides:
//! - npm range parsing on top of `semver`
//! - Constraint classification (ranges vs git / file / workspace / tags)
//! - Resolution of one constraint against a published version list
//! - The aggregator that fetches version metadata in chunks and builds the
//!   outdated map for a whole dependency set
//! - A last-write-wins holder for the most recent outdated map

mod constraint;
mod diff;
mod range;
mod resolver;
mod tracker;

pub use constraint::{classify_constraint, classify_dependencies};
pub use diff::semver_diff;
pub use range::NpmRange;
pub use resolver::{candidate_versions, resolve_outdated, signals_prerelease};
pub use tracker::OutdatedTracker;

use crate::domain::{DependencyConstraint, OutdatedDependencyInfo, PackageVersionsInfo};
use crate::error::RegistryError;
use crate::progress::Progress;
use crate::registry::{VersionSource, VersionsEntry};
use futures::future::join_all;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Number of package names sent in one bulk version request
pub const DEFAULT_CHUNK_SIZE: usize = 50;

/// A dependency whose version metadata could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedLookup {
    pub name: String,
    pub message: String,
}

/// Everything learned from one outdated computation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutdatedReport {
    /// Dependencies behind `latest`, keyed by name
    pub outdated: BTreeMap<String, OutdatedDependencyInfo>,
    /// Dependencies whose constraint is not a semver range
    pub excluded: Vec<DependencyConstraint>,
    /// Dependencies omitted because their lookup failed
    pub failed: Vec<FailedLookup>,
    /// Number of dependencies sent to the registry
    pub checked: usize,
}

impl OutdatedReport {
    /// Returns true if any lookup failed
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Computes the outdated map of a dependency set
pub struct OutdatedAggregator<S> {
    source: S,
    chunk_size: usize,
}

impl<S: VersionSource> OutdatedAggregator<S> {
    /// Create an aggregator with the default chunk size
    pub fn new(source: S) -> Self {
        Self {
            source,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the number of names per bulk request
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// The version source backing this aggregator
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Map each dependency that trails `latest` to its outdated info
    ///
    /// Non-semver constraints are skipped, as are dependencies without
    /// version data or a `latest` tag. Fails only if no chunk could be
    /// fetched at all.
    pub async fn compute_outdated(
        &self,
        constraints: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, OutdatedDependencyInfo>, RegistryError> {
        let report = self.analyze(constraints, &Progress::disabled()).await?;
        Ok(report.outdated)
    }

    /// Like `compute_outdated`, also reporting exclusions and failures
    pub async fn analyze(
        &self,
        constraints: &BTreeMap<String, String>,
        progress: &Progress,
    ) -> Result<OutdatedReport, RegistryError> {
        let mut report = OutdatedReport::default();
        if constraints.is_empty() {
            return Ok(report);
        }

        let (evaluable, excluded): (Vec<_>, Vec<_>) = classify_dependencies(constraints)
            .into_iter()
            .partition(DependencyConstraint::is_evaluable);
        report.excluded = excluded;

        let names: Vec<String> = evaluable.iter().map(|c| c.name.clone()).collect();
        report.checked = names.len();
        if names.is_empty() {
            return Ok(report);
        }

        let (lookup, failed) = self.fetch_all(&names, progress).await?;
        report.failed = failed;

        for constraint in &evaluable {
            let Some(info) = lookup.get(&constraint.name) else {
                continue;
            };
            let Some(latest) = info.latest() else {
                debug!(package = %constraint.name, "no latest dist-tag, skipping");
                continue;
            };
            if let Some(outdated) = resolve_outdated(&info.versions, latest, &constraint.raw) {
                report.outdated.insert(constraint.name.clone(), outdated);
            }
        }

        Ok(report)
    }

    /// Fetch every chunk concurrently and index the results by name
    async fn fetch_all(
        &self,
        names: &[String],
        progress: &Progress,
    ) -> Result<(HashMap<String, PackageVersionsInfo>, Vec<FailedLookup>), RegistryError> {
        let chunks: Vec<&[String]> = names.chunks(self.chunk_size).collect();
        debug!(
            dependencies = names.len(),
            chunks = chunks.len(),
            "fetching version metadata"
        );

        let results = join_all(chunks.iter().map(|chunk| async move {
            let result = self.source.fetch_versions_batch(chunk).await;
            let failed = match &result {
                Ok(entries) => entries
                    .iter()
                    .filter(|entry| matches!(entry, VersionsEntry::Failed { .. }))
                    .count(),
                Err(_) => chunk.len(),
            };
            progress.chunk_done(failed);
            result
        }))
        .await;

        let mut lookup = HashMap::new();
        let mut failed = Vec::new();
        let mut failed_chunks = 0;
        let mut last_error = None;

        for (chunk, result) in chunks.iter().zip(results) {
            match result {
                Ok(entries) => {
                    for entry in entries {
                        match entry {
                            VersionsEntry::Found(info) => {
                                lookup.insert(info.name.clone(), info);
                            }
                            VersionsEntry::Failed { name, message } => {
                                debug!(package = %name, %message, "omitting dependency");
                                failed.push(FailedLookup { name, message });
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(size = chunk.len(), error = %e, "chunk fetch failed");
                    failed_chunks += 1;
                    failed.extend(chunk.iter().map(|name| FailedLookup {
                        name: name.clone(),
                        message: e.to_string(),
                    }));
                    last_error = Some(e);
                }
            }
        }

        if failed_chunks == chunks.len() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        for name in names {
            let reported = lookup.contains_key(name) || failed.iter().any(|f| &f.name == name);
            if !reported {
                failed.push(FailedLookup {
                    name: name.clone(),
                    message: "no version data returned".to_string(),
                });
            }
        }

        Ok((lookup, failed))
    }
}
