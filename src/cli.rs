//! CLI argument parsing module for pkglens

use crate::outdated::DEFAULT_CHUNK_SIZE;
use crate::registry::DEFAULT_CONCURRENCY;
use clap::Parser;

/// Analyze an npm package: module format, bundled types, outdated dependencies
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pkglens",
    version,
    about = "Analyze npm packages: module format, types, and outdated dependencies"
)]
pub struct CliArgs {
    /// package.json, a directory containing one, or a registry spec
    /// (name, name@version, name@tag)
    #[arg(default_value = ".")]
    pub target: String,

    /// Registry URL (overrides NPM_CONFIG_REGISTRY and .npmrc)
    #[arg(long)]
    pub registry: Option<String>,

    /// Skip every registry request; only analyze a local manifest
    #[arg(long)]
    pub offline: bool,

    // Dependency sections
    /// Include devDependencies in the outdated check
    #[arg(long)]
    pub dev: bool,

    /// Include peerDependencies in the outdated check
    #[arg(long)]
    pub peer: bool,

    /// Include optionalDependencies in the outdated check
    #[arg(long)]
    pub optional: bool,

    /// Skip the outdated check entirely
    #[arg(long)]
    pub no_outdated: bool,

    /// Skip @types/* and create-* companion lookups
    #[arg(long)]
    pub no_companions: bool,

    // Fetch tuning
    /// Package names per bulk version request
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Concurrent registry requests per chunk
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output (debug logging)
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Write log events as JSON lines to stderr
    #[arg(long)]
    pub log_json: bool,

    /// Exit with status 3 when any dependency is behind latest
    #[arg(long)]
    pub fail_on_outdated: bool,
}

impl CliArgs {
    /// Whether the progress bar should be drawn
    pub fn show_progress(&self) -> bool {
        !(self.quiet || self.json || self.offline)
    }
}
