//! Memoization of package analysis records
//!
//! Analysis functions recompute on every call. Callers that analyze the
//! same published version repeatedly keep the result here, keyed by
//! `name@version`; a published version never changes, so entries are only
//! dropped on request.

use crate::domain::PackageAnalysis;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Thread-safe cache of analysis records
#[derive(Debug, Default)]
pub struct AnalysisCache {
    entries: RwLock<HashMap<String, PackageAnalysis>>,
}

/// Cache key of one published version
pub fn cache_key(name: &str, version: &str) -> String {
    format!("{name}@{version}")
}

impl AnalysisCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached analysis
    pub fn get(&self, name: &str, version: &str) -> Option<PackageAnalysis> {
        self.read().get(&cache_key(name, version)).cloned()
    }

    /// Store an analysis, replacing any previous entry
    pub fn insert(&self, name: &str, version: &str, analysis: PackageAnalysis) {
        self.write().insert(cache_key(name, version), analysis);
    }

    /// Return the cached analysis or compute and store it
    pub fn get_or_insert_with<F>(&self, name: &str, version: &str, compute: F) -> PackageAnalysis
    where
        F: FnOnce() -> PackageAnalysis,
    {
        if let Some(hit) = self.get(name, version) {
            debug!(package = name, version, "analysis cache hit");
            return hit;
        }

        let analysis = compute();
        self.insert(name, version, analysis.clone());
        analysis
    }

    /// Drop every version of one package
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_package(&self, name: &str) -> usize {
        let prefix = format!("{name}@");
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(&prefix));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(package = name, removed, "invalidated analysis cache entries");
        }
        removed
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.write().clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, PackageAnalysis>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, PackageAnalysis>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModuleFormat, TypesStatus};
    use std::cell::Cell;

    fn analysis(format: ModuleFormat) -> PackageAnalysis {
        PackageAnalysis {
            module_format: format,
            types: TypesStatus::None,
            engines: None,
            binary_only: false,
            create_package: None,
        }
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("react", "18.2.0"), "react@18.2.0");
        assert_eq!(cache_key("@types/node", "20.0.0"), "@types/node@20.0.0");
    }

    #[test]
    fn test_insert_and_get() {
        let cache = AnalysisCache::new();
        assert!(cache.is_empty());
        cache.insert("vite", "5.0.0", analysis(ModuleFormat::Esm));

        assert_eq!(
            cache.get("vite", "5.0.0").map(|a| a.module_format),
            Some(ModuleFormat::Esm)
        );
        assert!(cache.get("vite", "4.0.0").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_or_insert_with_computes_once() {
        let cache = AnalysisCache::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            analysis(ModuleFormat::Dual)
        };

        cache.get_or_insert_with("a", "1.0.0", compute);
        let second = cache.get_or_insert_with("a", "1.0.0", compute);
        assert_eq!(calls.get(), 1);
        assert_eq!(second.module_format, ModuleFormat::Dual);
    }

    #[test]
    fn test_invalidate_package_keeps_others() {
        let cache = AnalysisCache::new();
        cache.insert("a", "1.0.0", analysis(ModuleFormat::Cjs));
        cache.insert("a", "2.0.0", analysis(ModuleFormat::Esm));
        cache.insert("ab", "1.0.0", analysis(ModuleFormat::Cjs));

        assert_eq!(cache.invalidate_package("a"), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("ab", "1.0.0").is_some());

        cache.clear();
        assert!(cache.is_empty());
    }
}
