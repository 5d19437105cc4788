//! Runtime configuration
//!
//! The registry URL is taken from (in priority order):
//! - the `--registry` flag
//! - the `NPM_CONFIG_REGISTRY` / `npm_config_registry` environment variable
//! - `registry=` in the nearest `.npmrc` (target directory, then ancestors)
//! - the public npm registry

use crate::cli::CliArgs;
use crate::domain::DependencySection;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// The public npm registry
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// What to analyze
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A package.json on disk
    Manifest(PathBuf),
    /// A package fetched from the registry; `spec` is a tag, version, or range
    Package { name: String, spec: Option<String> },
}

impl Target {
    /// Interpret a CLI target
    ///
    /// Anything that looks like a path, or names an existing file or
    /// directory, is a manifest; everything else is a registry spec.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(invalid_target(input, "empty target"));
        }

        let path = Path::new(input);
        let looks_like_path = input.starts_with('.')
            || input.starts_with('/')
            || input.ends_with(".json")
            || (!input.starts_with('@') && input.contains('/'))
            || path.exists();
        if looks_like_path {
            return Ok(Target::Manifest(manifest_path(path)));
        }

        let (name, spec) = split_package_spec(input);
        validate_package_name(input, name)?;
        Ok(Target::Package {
            name: name.to_string(),
            spec: spec.map(str::to_string),
        })
    }

    /// Directory used for `.npmrc` lookup
    pub fn config_dir(&self) -> PathBuf {
        match self {
            Target::Manifest(path) => path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
            Target::Package { .. } => PathBuf::from("."),
        }
    }
}

fn manifest_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join("package.json")
    } else {
        path.to_path_buf()
    }
}

/// Split `name@spec`, keeping a scope's leading `@`
fn split_package_spec(input: &str) -> (&str, Option<&str>) {
    let search_from = usize::from(input.starts_with('@'));
    match input[search_from..].find('@') {
        Some(at) => {
            let at = at + search_from;
            let spec = &input[at + 1..];
            (&input[..at], (!spec.is_empty()).then_some(spec))
        }
        None => (input, None),
    }
}

fn validate_package_name(input: &str, name: &str) -> Result<(), ConfigError> {
    let bare = match name.strip_prefix('@') {
        Some(scoped) => {
            let (scope, rest) = scoped
                .split_once('/')
                .ok_or_else(|| invalid_target(input, "scoped name must be @scope/name"))?;
            if scope.is_empty() {
                return Err(invalid_target(input, "empty scope"));
            }
            rest
        }
        None => name,
    };

    if bare.is_empty() {
        return Err(invalid_target(input, "empty package name"));
    }
    if bare.contains('/') || bare.chars().any(char::is_whitespace) {
        return Err(invalid_target(input, "not a valid package name"));
    }
    Ok(())
}

fn invalid_target(value: &str, message: &str) -> ConfigError {
    ConfigError::InvalidTarget {
        value: value.to_string(),
        message: message.to_string(),
    }
}

/// Resolved runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub target: Target,
    /// Registry base URL without trailing slash
    pub registry: String,
    /// Dependency sections included in the outdated check
    pub sections: Vec<DependencySection>,
    pub chunk_size: usize,
    pub concurrency: usize,
    pub offline: bool,
    pub check_outdated: bool,
    pub lookup_companions: bool,
}

impl Config {
    /// Build the configuration from CLI arguments and the environment
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let env_registry = std::env::var("NPM_CONFIG_REGISTRY")
            .or_else(|_| std::env::var("npm_config_registry"))
            .ok();
        Self::resolve(args, env_registry)
    }

    /// Build the configuration with an explicit environment registry value
    pub fn resolve(args: &CliArgs, env_registry: Option<String>) -> Result<Self, ConfigError> {
        let target = Target::parse(&args.target)?;

        if args.chunk_size == 0 {
            return Err(ConfigError::InvalidLimit {
                name: "chunk size",
                value: args.chunk_size,
            });
        }
        if args.concurrency == 0 {
            return Err(ConfigError::InvalidLimit {
                name: "concurrency",
                value: args.concurrency,
            });
        }

        let registry = match args.registry.clone().or(env_registry) {
            Some(url) => url,
            None => read_npmrc_registry(&target.config_dir())
                .unwrap_or_else(|| DEFAULT_REGISTRY.to_string()),
        };

        let mut sections = vec![DependencySection::Dependencies];
        if args.dev {
            sections.push(DependencySection::DevDependencies);
        }
        if args.peer {
            sections.push(DependencySection::PeerDependencies);
        }
        if args.optional {
            sections.push(DependencySection::OptionalDependencies);
        }

        Ok(Self {
            target,
            registry: normalize_registry_url(&registry)?,
            sections,
            chunk_size: args.chunk_size,
            concurrency: args.concurrency,
            offline: args.offline,
            check_outdated: !args.no_outdated,
            lookup_companions: !args.no_companions,
        })
    }
}

/// Validate a registry URL and strip trailing slashes
pub fn normalize_registry_url(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    let has_host = ["https://", "http://"]
        .iter()
        .any(|scheme| trimmed.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
    if !has_host {
        return Err(ConfigError::InvalidRegistryUrl {
            value: value.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Read `registry=` from the nearest `.npmrc`
///
/// Searches `dir` and then each ancestor. Scoped registries
/// (`@scope:registry=`) are ignored.
pub fn read_npmrc_registry(dir: &Path) -> Option<String> {
    let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    dir.ancestors()
        .find_map(|ancestor| parse_npmrc_registry(&ancestor.join(".npmrc")))
}

fn parse_npmrc_registry(npmrc_path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(npmrc_path).ok()?;

    for line in content.lines() {
        let line = line.trim();
        // Skip comments
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim() == "registry" {
            // Handle quoted values like "https://..." or '...'
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    None
}
