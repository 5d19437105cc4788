//! Analysis orchestrator for coordinating the entire workflow
//!
//! This module provides:
//! - Workflow coordination: load manifest → companion lookups → analyze →
//!   outdated check
//! - Manifest loading from disk or from the registry
//! - Companion `@types/*` / `create-*` lookups, run concurrently
//! - Error handling with partial continuation (failed lookups become
//!   warnings; only a manifest that cannot be loaded or an unreachable
//!   registry is fatal)

use crate::analysis::{
    analyze_package, create_package_name, has_built_in_types, is_create_package_name,
    types_package_name, Companions,
};
use crate::cache::AnalysisCache;
use crate::config::{Config, Target};
use crate::domain::{PackageAnalysis, PackageManifest, RelatedPackageInfo};
use crate::error::{AppError, ConfigError, ManifestError, RegistryError};
use crate::outdated::{classify_dependencies, OutdatedAggregator, OutdatedReport};
use crate::progress::Progress;
use crate::registry::{HttpClient, NpmRegistry};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where the analyzed manifest came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum ReportSource {
    /// A package.json on disk
    File { path: PathBuf },
    /// A published version
    Registry { url: String },
}

/// Result of running the orchestrator
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub package: String,
    pub version: Option<String>,
    pub source: ReportSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub analysis: PackageAnalysis,
    /// `None` when the outdated check was skipped
    pub outdated: Option<OutdatedReport>,
    /// Lookups that failed without aborting the run
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Report {
    /// Returns true if some lookup failed
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Number of dependencies behind `latest`
    pub fn outdated_count(&self) -> usize {
        self.outdated
            .as_ref()
            .map(|report| report.outdated.values().filter(|o| o.is_behind()).count())
            .unwrap_or(0)
    }
}

/// Orchestrator for coordinating the analysis workflow
pub struct Orchestrator {
    config: Config,
    registry: NpmRegistry,
    cache: AnalysisCache,
}

/// A loaded manifest with its provenance
struct LoadedManifest {
    manifest: PackageManifest,
    version: Option<String>,
    published_at: Option<DateTime<Utc>>,
    source: ReportSource,
}

impl Orchestrator {
    /// Create a new orchestrator for the given configuration
    pub fn new(config: Config) -> Result<Self, AppError> {
        let client = HttpClient::new()?;
        Ok(Self::with_client(config, client))
    }

    /// Create an orchestrator with a custom HTTP client (for testing)
    pub fn with_client(config: Config, client: HttpClient) -> Self {
        let registry = NpmRegistry::with_base_url(client, config.registry.clone())
            .with_concurrency(config.concurrency);
        Self {
            config,
            registry,
            cache: AnalysisCache::new(),
        }
    }

    /// Analysis records computed so far
    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    /// Run the analysis workflow
    pub async fn run(&self, progress: &mut Progress) -> Result<Report, AppError> {
        let mut warnings = Vec::new();

        // Step 1: Load the manifest
        let loaded = self.load(progress).await?;
        let manifest = &loaded.manifest;

        // Step 2: Companion lookups
        let companions = if self.config.offline || !self.config.lookup_companions {
            Companions::default()
        } else {
            progress.spinner("Looking up companion packages...");
            let companions = self.lookup_companions(manifest, &mut warnings).await;
            progress.finish_and_clear();
            companions
        };

        // Step 3: Analyze, memoized per published version
        let analysis = match (&loaded.source, &loaded.version) {
            (ReportSource::Registry { .. }, Some(version)) => {
                self.cache
                    .get_or_insert_with(&manifest.name, version, || {
                        analyze_package(manifest, &companions)
                    })
            }
            _ => analyze_package(manifest, &companions),
        };

        // Step 4: Outdated check
        let outdated = if self.config.offline || !self.config.check_outdated {
            None
        } else {
            let report = self.check_outdated(manifest, progress).await?;
            warnings.extend(
                report
                    .failed
                    .iter()
                    .map(|f| format!("failed to fetch {}: {}", f.name, f.message)),
            );
            Some(report)
        };

        Ok(Report {
            package: manifest.name.clone(),
            version: loaded.version,
            source: loaded.source,
            published_at: loaded.published_at,
            analysis,
            outdated,
            warnings,
        })
    }

    async fn load(&self, progress: &mut Progress) -> Result<LoadedManifest, AppError> {
        match &self.config.target {
            Target::Manifest(path) => {
                let manifest = load_manifest(path)?;
                Ok(LoadedManifest {
                    version: manifest.version.clone(),
                    manifest,
                    published_at: None,
                    source: ReportSource::File { path: path.clone() },
                })
            }
            Target::Package { name, spec } => {
                if self.config.offline {
                    return Err(ConfigError::InvalidTarget {
                        value: name.clone(),
                        message: "registry packages cannot be analyzed with --offline"
                            .to_string(),
                    }
                    .into());
                }

                progress.spinner(&format!("Fetching {}...", name));
                let resolved = self.registry.fetch_manifest(name, spec.as_deref()).await;
                progress.finish_and_clear();
                let resolved = resolved?;

                let mut manifest = resolved.manifest;
                if manifest.name.is_empty() {
                    manifest.name = name.clone();
                }
                Ok(LoadedManifest {
                    manifest,
                    version: Some(resolved.version),
                    published_at: resolved.published_at,
                    source: ReportSource::Registry {
                        url: self.config.registry.clone(),
                    },
                })
            }
        }
    }

    /// Look up `@types/*` and `create-*` companions concurrently
    async fn lookup_companions(
        &self,
        manifest: &PackageManifest,
        warnings: &mut Vec<String>,
    ) -> Companions {
        let name = manifest.name.as_str();
        if name.is_empty() {
            return Companions::default();
        }

        let wants_types = !has_built_in_types(manifest) && !name.starts_with("@types/");
        let wants_create = !is_create_package_name(name);

        let types_lookup = async {
            if wants_types {
                Some(self.registry.fetch_related(&types_package_name(name)).await)
            } else {
                None
            }
        };
        let create_lookup = async {
            if wants_create {
                Some(self.registry.fetch_related(&create_package_name(name)).await)
            } else {
                None
            }
        };
        let (types, create) = tokio::join!(types_lookup, create_lookup);

        Companions {
            types_package: companion_or_warn(types, warnings),
            create_package: companion_or_warn(create, warnings),
        }
    }

    async fn check_outdated(
        &self,
        manifest: &PackageManifest,
        progress: &mut Progress,
    ) -> Result<OutdatedReport, RegistryError> {
        let constraints = manifest.dependency_constraints(&self.config.sections);
        let evaluable = classify_dependencies(&constraints)
            .iter()
            .filter(|c| c.is_evaluable())
            .count();
        debug!(
            total = constraints.len(),
            evaluable, "checking dependencies"
        );

        let aggregator = OutdatedAggregator::new(self.registry.clone())
            .with_chunk_size(self.config.chunk_size);

        let chunk_size = self.config.chunk_size.max(1);
        progress.start_chunks(evaluable.div_ceil(chunk_size), evaluable);
        let result = aggregator.analyze(&constraints, progress).await;
        progress.finish_and_clear();
        result
    }
}

fn companion_or_warn(
    lookup: Option<Result<Option<RelatedPackageInfo>, RegistryError>>,
    warnings: &mut Vec<String>,
) -> Option<RelatedPackageInfo> {
    match lookup? {
        Ok(info) => info,
        Err(e) => {
            warn!(error = %e, "companion lookup failed");
            warnings.push(e.to_string());
            None
        }
    }
}

/// Read and parse a package.json
pub fn load_manifest(path: &Path) -> Result<PackageManifest, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::not_found(path));
    }
    let content =
        std::fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))?;
    PackageManifest::from_json(&content)
        .map_err(|e| ManifestError::json_parse_error(path, e.to_string()))
}
