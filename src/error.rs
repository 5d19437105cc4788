//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues reading or parsing a package.json
//! - RegistryError: Issues with package registry communication
//! - ConfigError: Issues with CLI / .npmrc configuration
//!
//! An unsatisfiable constraint or a missing dist-tag is not an error; the
//! outdated analysis reports those as absent entries.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Package registry related errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },
}

/// Errors related to package registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// No published version matches the requested tag, version, or range
    #[error("no version of '{package}' matches '{spec}'")]
    VersionNotFound { package: String, spec: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {registry} registry")]
    RateLimitExceeded { registry: String },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },

    /// Every request of a batch failed
    #[error("{registry} registry unavailable: {message}")]
    Unavailable { registry: String, message: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Registry URL is not an http(s) URL
    #[error("invalid registry URL '{value}': expected an http:// or https:// URL")]
    InvalidRegistryUrl { value: String },

    /// Chunk size or concurrency of zero
    #[error("invalid {name} '{value}': must be at least 1")]
    InvalidLimit { name: &'static str, value: usize },

    /// Target is neither a manifest path nor a package spec
    #[error("invalid target '{value}': {message}")]
    InvalidTarget { value: String, message: String },
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new VersionNotFound error
    pub fn version_not_found(package: impl Into<String>, spec: impl Into<String>) -> Self {
        RegistryError::VersionNotFound {
            package: package.into(),
            spec: spec.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new RateLimitExceeded error
    pub fn rate_limit_exceeded(registry: impl Into<String>) -> Self {
        RegistryError::RateLimitExceeded {
            registry: registry.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new Unavailable error
    pub fn unavailable(registry: impl Into<String>, message: impl Into<String>) -> Self {
        RegistryError::Unavailable {
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Returns true if the registry answered that the package does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::PackageNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error_not_found() {
        let err = ManifestError::not_found("/path/to/package.json");
        let msg = format!("{}", err);
        assert!(msg.contains("manifest file not found"));
        assert!(msg.contains("package.json"));
    }

    #[test]
    fn test_manifest_error_json_parse() {
        let err = ManifestError::json_parse_error("/path/to/package.json", "unexpected token");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse JSON"));
        assert!(msg.contains("unexpected token"));
    }

    #[test]
    fn test_manifest_error_read() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ManifestError::read_error("/root/package.json", io);
        assert!(err.to_string().contains("failed to read manifest file"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_registry_error_package_not_found() {
        let err = RegistryError::package_not_found("nonexistent-package", "npm");
        let msg = format!("{}", err);
        assert!(msg.contains("package 'nonexistent-package' not found"));
        assert!(msg.contains("npm"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_registry_error_version_not_found() {
        let err = RegistryError::version_not_found("react", "^99.0.0");
        assert_eq!(err.to_string(), "no version of 'react' matches '^99.0.0'");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_registry_error_network() {
        let err = RegistryError::network_error("lodash", "npm", "connection refused");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to fetch"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_registry_error_rate_limit() {
        let err = RegistryError::rate_limit_exceeded("npm");
        let msg = format!("{}", err);
        assert!(msg.contains("rate limit exceeded"));
    }

    #[test]
    fn test_registry_error_timeout() {
        let err = RegistryError::timeout("vite", "npm");
        let msg = format!("{}", err);
        assert!(msg.contains("timeout"));
        assert!(msg.contains("vite"));
    }

    #[test]
    fn test_registry_error_unavailable() {
        let err = RegistryError::unavailable("npm", "connection refused");
        assert_eq!(
            err.to_string(),
            "npm registry unavailable: connection refused"
        );
    }

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::InvalidRegistryUrl {
            value: "ftp://x".to_string(),
        };
        assert!(err.to_string().contains("ftp://x"));

        let err = ConfigError::InvalidLimit {
            name: "chunk size",
            value: 0,
        };
        assert_eq!(err.to_string(), "invalid chunk size '0': must be at least 1");
    }

    #[test]
    fn test_app_error_from_manifest_error() {
        let app_err: AppError = ManifestError::not_found("/path").into();
        assert!(app_err.to_string().contains("manifest file not found"));
    }

    #[test]
    fn test_app_error_from_registry_error() {
        let app_err: AppError = RegistryError::package_not_found("pkg", "npm").into();
        assert!(app_err.to_string().contains("package 'pkg' not found"));
    }

    #[test]
    fn test_app_error_from_config_error() {
        let app_err: AppError = ConfigError::InvalidTarget {
            value: "@".to_string(),
            message: "empty package name".to_string(),
        }
        .into();
        assert!(app_err.to_string().contains("invalid target"));
    }

    #[test]
    fn test_error_debug_trait() {
        let err = ManifestError::not_found("/test");
        let debug = format!("{:?}", err);
        assert!(debug.contains("NotFound"));
    }
}
