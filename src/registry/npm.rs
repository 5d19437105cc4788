//! npm Registry adapter
//!
//! Fetches package metadata from an npm-compatible registry.
//! API endpoint: {registry}/{package}
//!
//! Full packuments are used when a version's manifest is needed; the
//! abbreviated form (`application/vnd.npm.install-v1+json`) is enough for
//! version lists and dist-tags.

use crate::config::DEFAULT_REGISTRY;
use crate::domain::{PackageManifest, PackageVersionsInfo, RelatedPackageInfo};
use crate::error::RegistryError;
use crate::outdated::{candidate_versions, NpmRange};
use crate::registry::{HttpClient, VersionSource, VersionsEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Accept header for abbreviated packuments
const ABBREVIATED_ACCEPT: &str = "application/vnd.npm.install-v1+json";

/// Default number of in-flight requests per batch
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Registry label used in errors
const REGISTRY_NAME: &str = "npm";

/// npm Registry adapter
#[derive(Clone)]
pub struct NpmRegistry {
    client: HttpClient,
    base_url: String,
    concurrency: usize,
}

/// Full packument response
#[derive(Debug, Deserialize)]
struct Packument {
    #[serde(rename = "dist-tags", default)]
    dist_tags: BTreeMap<String, String>,
    /// Kept as raw JSON; only the selected version is parsed
    #[serde(default)]
    versions: HashMap<String, serde_json::Value>,
    /// Version time information
    #[serde(default)]
    time: HashMap<String, serde_json::Value>,
}

/// Abbreviated packument response
#[derive(Debug, Deserialize)]
struct AbbreviatedPackument {
    name: String,
    #[serde(rename = "dist-tags", default)]
    dist_tags: BTreeMap<String, String>,
    #[serde(default)]
    versions: HashMap<String, AbbreviatedVersion>,
}

#[derive(Debug, Deserialize)]
struct AbbreviatedVersion {
    #[serde(default)]
    deprecated: Option<serde_json::Value>,
}

/// A manifest selected from a packument
#[derive(Debug, Clone)]
pub struct ResolvedManifest {
    pub manifest: PackageManifest,
    pub version: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl NpmRegistry {
    /// Create an adapter for the public npm registry
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, DEFAULT_REGISTRY)
    }

    /// Create an adapter for a custom registry
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the number of in-flight requests per batch
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Build the URL for a package
    ///
    /// The scope separator is percent-encoded, as the registry expects.
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}", self.base_url, package.replacen('/', "%2F", 1))
    }

    /// Fetch the manifest of one version
    ///
    /// `spec` may be a dist-tag, an exact version, or a range; `None` means
    /// the `latest` tag.
    pub async fn fetch_manifest(
        &self,
        package: &str,
        spec: Option<&str>,
    ) -> Result<ResolvedManifest, RegistryError> {
        let url = self.build_url(package);
        let packument: Packument = self
            .client
            .get_json(&url, None, package, REGISTRY_NAME)
            .await?;

        let spec = spec.unwrap_or("latest");
        let published: Vec<String> = packument.versions.keys().cloned().collect();
        let version = select_version(&published, &packument.dist_tags, spec)
            .ok_or_else(|| RegistryError::version_not_found(package, spec))?;

        let raw = packument
            .versions
            .get(&version)
            .cloned()
            .ok_or_else(|| RegistryError::version_not_found(package, spec))?;
        let manifest: PackageManifest =
            serde_json::from_value(raw).map_err(|e| RegistryError::InvalidResponse {
                package: package.to_string(),
                registry: REGISTRY_NAME.to_string(),
                message: format!("invalid manifest for {}: {}", version, e),
            })?;

        let published_at = packument
            .time
            .get(&version)
            .and_then(|t| t.as_str())
            .and_then(|t| t.parse::<DateTime<Utc>>().ok());

        Ok(ResolvedManifest {
            manifest,
            version,
            published_at,
        })
    }

    /// Fetch published versions and dist-tags of one package
    pub async fn fetch_versions(&self, package: &str) -> Result<PackageVersionsInfo, RegistryError> {
        let packument = self.fetch_abbreviated(package).await?;
        let mut versions: Vec<String> = packument.versions.into_keys().collect();
        versions.sort();

        Ok(PackageVersionsInfo::new(
            packument.name,
            versions,
            packument.dist_tags,
        ))
    }

    /// Look up a companion package (`@types/*`, `create-*`)
    ///
    /// Returns `Ok(None)` if the package does not exist. The deprecation
    /// message is taken from the version `latest` points at.
    pub async fn fetch_related(
        &self,
        package: &str,
    ) -> Result<Option<RelatedPackageInfo>, RegistryError> {
        let packument = match self.fetch_abbreviated(package).await {
            Ok(p) => p,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        let deprecated = packument
            .dist_tags
            .get("latest")
            .and_then(|latest| packument.versions.get(latest))
            .and_then(|v| v.deprecated.as_ref())
            .and_then(|d| d.as_str())
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(Some(RelatedPackageInfo {
            package_name: packument.name,
            deprecated,
        }))
    }

    async fn fetch_abbreviated(&self, package: &str) -> Result<AbbreviatedPackument, RegistryError> {
        let url = self.build_url(package);
        self.client
            .get_json(&url, Some(ABBREVIATED_ACCEPT), package, REGISTRY_NAME)
            .await
    }
}

/// Pick a version for a tag, exact version, or range
pub fn select_version(
    published: &[String],
    dist_tags: &BTreeMap<String, String>,
    spec: &str,
) -> Option<String> {
    let spec = spec.trim();

    if let Some(tagged) = dist_tags.get(spec) {
        return Some(tagged.clone());
    }
    if published.iter().any(|v| v == spec) {
        return Some(spec.to_string());
    }

    let range = NpmRange::parse(spec)?;
    let candidates = candidate_versions(published, spec);
    range.max_satisfying(&candidates).map(|v| v.to_string())
}

#[async_trait]
impl VersionSource for NpmRegistry {
    async fn fetch_versions_batch(
        &self,
        names: &[String],
    ) -> Result<Vec<VersionsEntry>, RegistryError> {
        let results: Vec<(String, Result<PackageVersionsInfo, RegistryError>)> =
            stream::iter(names.iter().cloned())
                .map(|name| async move {
                    let result = self.fetch_versions(&name).await;
                    (name, result)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let mut entries = Vec::with_capacity(results.len());
        let mut transport_failures = 0;
        let mut first_failure = None;

        for (name, result) in results {
            match result {
                Ok(info) => entries.push(VersionsEntry::Found(info)),
                Err(e) => {
                    if !e.is_not_found() {
                        transport_failures += 1;
                        if first_failure.is_none() {
                            first_failure = Some(e.to_string());
                        }
                    }
                    debug!(package = %name, error = %e, "version lookup failed");
                    entries.push(VersionsEntry::Failed {
                        name,
                        message: e.to_string(),
                    });
                }
            }
        }

        // Nothing came back at all: the registry itself is unreachable
        if !names.is_empty() && transport_failures == names.len() {
            let message = first_failure.unwrap_or_default();
            warn!(registry = %self.base_url, %message, "every request in batch failed");
            return Err(RegistryError::unavailable(REGISTRY_NAME, message));
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RetryPolicy;

    fn registry() -> NpmRegistry {
        NpmRegistry::new(HttpClient::new().unwrap())
    }

    fn tags(latest: &str) -> BTreeMap<String, String> {
        let mut tags = BTreeMap::new();
        tags.insert("latest".to_string(), latest.to_string());
        tags.insert("next".to_string(), "3.0.0-beta.2".to_string());
        tags
    }

    fn published() -> Vec<String> {
        ["1.0.0", "1.4.2", "2.0.0", "2.1.0", "3.0.0-beta.2"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_build_url() {
        assert_eq!(
            registry().build_url("lodash"),
            "https://registry.npmjs.org/lodash"
        );
    }

    #[test]
    fn test_build_url_scoped_package() {
        assert_eq!(
            registry().build_url("@types/node"),
            "https://registry.npmjs.org/@types%2Fnode"
        );
    }

    #[test]
    fn test_custom_base_url_trailing_slash() {
        let registry =
            NpmRegistry::with_base_url(HttpClient::new().unwrap(), "https://npm.example.com/");
        assert_eq!(registry.build_url("x"), "https://npm.example.com/x");
    }

    #[test]
    fn test_concurrency_at_least_one() {
        assert_eq!(registry().with_concurrency(0).concurrency, 1);
        assert_eq!(registry().concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_select_version_by_tag() {
        assert_eq!(
            select_version(&published(), &tags("2.1.0"), "latest"),
            Some("2.1.0".to_string())
        );
        assert_eq!(
            select_version(&published(), &tags("2.1.0"), "next"),
            Some("3.0.0-beta.2".to_string())
        );
    }

    #[test]
    fn test_select_version_exact() {
        assert_eq!(
            select_version(&published(), &tags("2.1.0"), "1.4.2"),
            Some("1.4.2".to_string())
        );
    }

    #[test]
    fn test_select_version_range() {
        assert_eq!(
            select_version(&published(), &tags("2.1.0"), "^1.0.0"),
            Some("1.4.2".to_string())
        );
        assert_eq!(select_version(&published(), &tags("2.1.0"), "^4.0.0"), None);
        assert_eq!(select_version(&published(), &tags("2.1.0"), "canary"), None);
    }

    #[test]
    fn test_parse_abbreviated_packument() {
        let json = r#"{
            "name": "left-pad",
            "dist-tags": {"latest": "1.3.0"},
            "modified": "2018-04-09T00:00:00.000Z",
            "versions": {
                "1.2.0": {"name": "left-pad", "version": "1.2.0"},
                "1.3.0": {"name": "left-pad", "version": "1.3.0", "deprecated": "use String.prototype.padStart()"}
            }
        }"#;
        let packument: AbbreviatedPackument = serde_json::from_str(json).unwrap();
        assert_eq!(packument.name, "left-pad");
        assert_eq!(packument.versions.len(), 2);
        assert!(packument.versions["1.3.0"].deprecated.is_some());
    }

    #[test]
    fn test_parse_full_packument_keeps_raw_versions() {
        let json = r#"{
            "name": "x",
            "dist-tags": {"latest": "1.0.0"},
            "versions": {"1.0.0": {"name": "x", "version": "1.0.0", "engines": ["node"]}},
            "time": {"created": "2020-01-01T00:00:00.000Z", "1.0.0": "2020-01-01T00:00:00.000Z"}
        }"#;
        let packument: Packument = serde_json::from_str(json).unwrap();
        let manifest: PackageManifest =
            serde_json::from_value(packument.versions["1.0.0"].clone()).unwrap();
        assert_eq!(manifest.version.as_deref(), Some("1.0.0"));
        assert!(packument.time["1.0.0"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_batch_against_unreachable_registry_is_unavailable() {
        let client = HttpClient::new().unwrap().with_retry(RetryPolicy::none());
        let registry = NpmRegistry::with_base_url(client, "http://127.0.0.1:9");
        let names = vec!["a".to_string(), "b".to_string()];

        let result = registry.fetch_versions_batch(&names).await;
        assert!(matches!(result, Err(RegistryError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_empty_batch_is_empty() {
        let entries = registry().fetch_versions_batch(&[]).await.unwrap();
        assert!(entries.is_empty());
    }
}
